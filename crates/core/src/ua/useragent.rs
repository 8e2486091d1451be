use std::fmt;

use super::version::Version;

/// A browser family recognized by the user-agent parser.
///
/// Families map 1:1 onto the browser keys used by the catalog's
/// targeting data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Chrome,
    Edge,
    Firefox,
    Safari,
    IosSafari,
    Opera,
    Ie,
    Samsung,
}

impl Family {
    /// The catalog browser key for this family.
    pub fn key(&self) -> &'static str {
        match self {
            Family::Chrome => "chrome",
            Family::Edge => "edge",
            Family::Firefox => "firefox",
            Family::Safari => "safari",
            Family::IosSafari => "ios_saf",
            Family::Opera => "opera",
            Family::Ie => "ie",
            Family::Samsung => "samsung",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A parsed `User-Agent` header: a recognized browser, or `Unknown`.
///
/// Unknown agents carry no targeting information; the request-level
/// `unknown` policy decides whether they receive every requested polyfill
/// or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAgent {
    Known { family: Family, version: Version },
    Unknown,
}

impl UserAgent {
    /// Parses a raw `User-Agent` header value.
    ///
    /// Recognition is token-based rather than regex-based: each family is
    /// identified by its product token, checked in an order that resolves
    /// the impersonation chains baked into real-world UA strings (Edge and
    /// Opera claim to be Chrome, Chrome claims to be Safari, everything
    /// claims to be Mozilla).
    pub fn parse(header: &str) -> Self {
        // Chromium-derived browsers first; their tokens are unambiguous.
        for (marker, family) in [
            ("Edg/", Family::Edge),
            ("Edge/", Family::Edge),
            ("EdgA/", Family::Edge),
            ("SamsungBrowser/", Family::Samsung),
            ("OPR/", Family::Opera),
        ] {
            if let Some(version) = version_after(header, marker) {
                return UserAgent::Known { family, version };
            }
        }

        if let Some(version) = version_after(header, "Chrome/") {
            return UserAgent::Known {
                family: Family::Chrome,
                version,
            };
        }

        if let Some(version) = version_after(header, "Firefox/") {
            return UserAgent::Known {
                family: Family::Firefox,
                version,
            };
        }

        // Safari reports its version in a separate `Version/` token; the
        // `Safari/` token itself carries a WebKit build number.
        if header.contains("Safari/") {
            if let Some(version) = version_after(header, "Version/") {
                let family = if header.contains("iPhone") || header.contains("iPad") {
                    Family::IosSafari
                } else {
                    Family::Safari
                };
                return UserAgent::Known { family, version };
            }
        }

        if let Some(version) = version_after(header, "MSIE ") {
            return UserAgent::Known {
                family: Family::Ie,
                version,
            };
        }
        // IE11 dropped the MSIE token.
        if header.contains("Trident/") {
            if let Some(version) = version_after(header, "rv:") {
                return UserAgent::Known {
                    family: Family::Ie,
                    version,
                };
            }
        }

        UserAgent::Unknown
    }

    /// The catalog browser key, when the agent was recognized.
    pub fn family_key(&self) -> Option<&'static str> {
        match self {
            UserAgent::Known { family, .. } => Some(family.key()),
            UserAgent::Unknown => None,
        }
    }

    /// Returns true if the agent was not recognized.
    pub fn is_unknown(&self) -> bool {
        matches!(self, UserAgent::Unknown)
    }
}

/// Extracts the version digits immediately following `marker`, if present.
fn version_after(header: &str, marker: &str) -> Option<Version> {
    let start = header.find(marker)? + marker.len();
    let digits: String = header[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}
