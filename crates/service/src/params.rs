//! Request parameter extraction for the polyfill route.
//!
//! Turns the query string and request headers into the bundle options the
//! core library understands, plus the route-level strict flag and
//! compression scheme. Unrecognized values degrade to defaults; rejecting
//! unknown feature names is the route's strict-mode concern.

use axum::http::{header, HeaderMap};

use polyfill_core::bundle::{BundleOptions, FeatureFlags, FeatureRequest, UnknownPolicy};
use polyfill_core::ua::UserAgent;

use crate::compression::Encoding;

/// Everything the polyfill route needs to know about one request.
#[derive(Debug, Clone)]
pub struct PolyfillParameters {
    /// Options handed to the bundle generator.
    pub options: BundleOptions,
    /// Reject the request if any requested feature name is unknown.
    pub strict: bool,
    /// Content encoding to apply to the response body.
    pub compression: Encoding,
}

impl PolyfillParameters {
    /// Extracts parameters from the raw query string and headers.
    ///
    /// Query parameters:
    /// - `features` - comma-separated names, each optionally `Name|flag|...`
    ///   (defaults to `default`)
    /// - `excludes` - comma-separated polyfill names to drop
    /// - `flags` - comma-separated flags applied to every feature
    /// - `ua` - user-agent override (otherwise the `User-Agent` header)
    /// - `unknown` - `polyfill` (default) or `ignore`
    /// - `callback` - JSONP callback name (ignored unless `[A-Za-z0-9_.]+`)
    /// - `strict` - presence enables strict mode
    /// - `compression` - `gzip`, `br` or `identity` (otherwise negotiated
    ///   from `Accept-Encoding`)
    pub fn from_request(query: Option<&str>, headers: &HeaderMap, minify: bool) -> Self {
        let pairs = parse_query(query.unwrap_or_default());

        let global_flags = first(&pairs, "flags")
            .map(|value| FeatureFlags::from_tokens(value.split(',')))
            .unwrap_or_default();

        let mut features: Vec<FeatureRequest> = first(&pairs, "features")
            .map(parse_features)
            .unwrap_or_default();
        if features.is_empty() {
            features.push(FeatureRequest::new("default"));
        }
        for request in &mut features {
            request.flags = request.flags.merge(global_flags);
        }

        let excludes = first(&pairs, "excludes")
            .map(|value| {
                value
                    .split(',')
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let ua_header = header_str(headers, header::USER_AGENT);
        let ua_string = first(&pairs, "ua").unwrap_or(ua_header);
        let user_agent = UserAgent::parse(ua_string);

        let unknown = first(&pairs, "unknown")
            .and_then(UnknownPolicy::parse)
            .unwrap_or_default();

        let callback = first(&pairs, "callback")
            .filter(|value| is_valid_callback(value))
            .map(str::to_string);

        let strict = pairs.iter().any(|(key, _)| key == "strict");

        let compression = match first(&pairs, "compression") {
            Some(value) => Encoding::parse(value).unwrap_or_default(),
            None => Encoding::negotiate(header_str(headers, header::ACCEPT_ENCODING)),
        };

        Self {
            options: BundleOptions {
                features,
                excludes,
                user_agent,
                unknown,
                minify,
                callback,
            },
            strict,
            compression,
        }
    }
}

/// Splits a raw query string into decoded key/value pairs.
fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// First value for the given key; repeated parameters beyond it are ignored.
fn first<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, value)| value.as_str())
}

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn parse_features(value: &str) -> Vec<FeatureRequest> {
    value
        .split(',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let mut parts = token.split('|');
            let name = parts.next().unwrap_or_default();
            FeatureRequest::new(name).with_flags(FeatureFlags::from_tokens(parts))
        })
        .collect()
}

/// JSONP callback names are restricted to dotted identifiers.
fn is_valid_callback(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyfill_core::ua::Family;

    const CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

    fn from_query(query: &str) -> PolyfillParameters {
        PolyfillParameters::from_request(Some(query), &HeaderMap::new(), false)
    }

    #[test]
    fn test_defaults() {
        let parameters = from_query("");
        assert_eq!(
            parameters.options.features,
            vec![FeatureRequest::new("default")]
        );
        assert!(parameters.options.excludes.is_empty());
        assert_eq!(parameters.options.user_agent, UserAgent::Unknown);
        assert_eq!(parameters.options.unknown, UnknownPolicy::Polyfill);
        assert!(!parameters.options.minify);
        assert!(parameters.options.callback.is_none());
        assert!(!parameters.strict);
        assert_eq!(parameters.compression, Encoding::Identity);
    }

    #[test]
    fn test_features_with_flags() {
        let parameters = from_query("features=fetch,Array.from|always|gated,es2015|always");
        let features = &parameters.options.features;

        assert_eq!(features.len(), 3);
        assert_eq!(features[0].name, "fetch");
        assert_eq!(features[0].flags, FeatureFlags::default());
        assert_eq!(features[1].name, "Array.from");
        assert!(features[1].flags.always && features[1].flags.gated);
        assert_eq!(features[2].name, "es2015");
        assert!(features[2].flags.always && !features[2].flags.gated);
    }

    #[test]
    fn test_encoded_pipe_separators() {
        let parameters = from_query("features=fetch%7Calways");
        let features = &parameters.options.features;
        assert_eq!(features[0].name, "fetch");
        assert!(features[0].flags.always);
    }

    #[test]
    fn test_global_flags_merged_into_every_feature() {
        let parameters = from_query("features=fetch,Promise&flags=gated");
        for request in &parameters.options.features {
            assert!(request.flags.gated);
        }
    }

    #[test]
    fn test_excludes() {
        let parameters = from_query("features=default&excludes=Promise,fetch");
        assert_eq!(
            parameters.options.excludes,
            vec!["Promise".to_string(), "fetch".to_string()]
        );
    }

    #[test]
    fn test_ua_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, CHROME.parse().unwrap());
        let parameters = PolyfillParameters::from_request(Some("features=fetch"), &headers, false);

        match parameters.options.user_agent {
            UserAgent::Known { family, .. } => assert_eq!(family, Family::Chrome),
            UserAgent::Unknown => panic!("expected a recognized agent"),
        }
    }

    #[test]
    fn test_ua_parameter_overrides_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, CHROME.parse().unwrap());
        let parameters = PolyfillParameters::from_request(
            Some("ua=Mozilla/5.0 (compatible; MSIE 9.0; Windows NT 6.1; Trident/5.0)"),
            &headers,
            false,
        );

        match parameters.options.user_agent {
            UserAgent::Known { family, .. } => assert_eq!(family, Family::Ie),
            UserAgent::Unknown => panic!("expected a recognized agent"),
        }
    }

    #[test]
    fn test_unknown_policy() {
        assert_eq!(
            from_query("unknown=ignore").options.unknown,
            UnknownPolicy::Ignore
        );
        assert_eq!(
            from_query("unknown=bogus").options.unknown,
            UnknownPolicy::Polyfill
        );
    }

    #[test]
    fn test_strict_is_presence_based() {
        assert!(from_query("features=fetch&strict").strict);
        assert!(from_query("strict=true").strict);
        assert!(!from_query("features=fetch").strict);
    }

    #[test]
    fn test_callback_validation() {
        assert_eq!(
            from_query("callback=app.onPolyfills").options.callback,
            Some("app.onPolyfills".to_string())
        );
        assert_eq!(from_query("callback=alert(1)").options.callback, None);
        assert_eq!(from_query("callback=").options.callback, None);
    }

    #[test]
    fn test_explicit_compression() {
        assert_eq!(from_query("compression=gzip").compression, Encoding::Gzip);
        assert_eq!(from_query("compression=br").compression, Encoding::Brotli);
        // Unsupported schemes degrade to identity rather than erroring.
        assert_eq!(
            from_query("compression=zstd").compression,
            Encoding::Identity
        );
    }

    #[test]
    fn test_compression_negotiated_from_accept_encoding() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_ENCODING, "gzip, br".parse().unwrap());
        let parameters = PolyfillParameters::from_request(Some("features=fetch"), &headers, false);
        assert_eq!(parameters.compression, Encoding::Brotli);
    }

    #[test]
    fn test_minify_flag_carried_into_options() {
        let parameters = PolyfillParameters::from_request(None, &HeaderMap::new(), true);
        assert!(parameters.options.minify);
    }
}
