use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ua::{UserAgent, VersionRange};

/// A single polyfill definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polyfill {
    pub name: String,
    /// JavaScript feature-detection expression. Truthy means the browser
    /// supports the feature natively. Absent for unconditional shims.
    #[serde(default)]
    pub detect: Option<String>,
    /// The polyfill body itself.
    pub source: String,
    /// Names of polyfills that must be emitted before this one.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Browser key -> version range that still needs this polyfill.
    #[serde(default)]
    pub browsers: BTreeMap<String, VersionRange>,
}

impl Polyfill {
    /// Creates a polyfill with the given name and source.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detect: None,
            source: source.into(),
            dependencies: Vec::new(),
            browsers: BTreeMap::new(),
        }
    }

    /// Sets the feature-detection expression.
    pub fn with_detect(mut self, detect: impl Into<String>) -> Self {
        self.detect = Some(detect.into());
        self
    }

    /// Sets the dependency list.
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a browser version range that still needs this polyfill.
    pub fn with_browser(mut self, family: impl Into<String>, range: VersionRange) -> Self {
        self.browsers.insert(family.into(), range);
        self
    }

    /// Returns true if the given user agent needs this polyfill.
    ///
    /// Unknown agents never match here; the request-level `unknown`
    /// policy decides their fate.
    pub fn required_for(&self, ua: &UserAgent) -> bool {
        match ua {
            UserAgent::Known { family, version } => self
                .browsers
                .get(family.key())
                .is_some_and(|range| range.matches(*version)),
            UserAgent::Unknown => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ua::{Family, Version};

    fn chrome(major: u32) -> UserAgent {
        UserAgent::Known {
            family: Family::Chrome,
            version: Version::new(major, 0),
        }
    }

    #[test]
    fn test_required_for_matching_range() {
        let polyfill = Polyfill::new("fetch", "self.fetch = function () {};")
            .with_browser("chrome", "<42".parse().unwrap());

        assert!(polyfill.required_for(&chrome(41)));
        assert!(!polyfill.required_for(&chrome(42)));
    }

    #[test]
    fn test_required_for_unlisted_family() {
        let polyfill = Polyfill::new("fetch", "self.fetch = function () {};")
            .with_browser("ie", "*".parse().unwrap());

        assert!(!polyfill.required_for(&chrome(41)));
    }

    #[test]
    fn test_required_for_unknown_agent() {
        let polyfill = Polyfill::new("fetch", "self.fetch = function () {};")
            .with_browser("chrome", "*".parse().unwrap());

        assert!(!polyfill.required_for(&UserAgent::Unknown));
    }
}
