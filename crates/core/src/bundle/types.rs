use std::fmt::Write as _;

use crate::ua::UserAgent;

/// Per-feature modifiers carried through alias expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Include the polyfill regardless of the requesting browser.
    pub always: bool,
    /// Wrap the polyfill in its feature-detection test.
    pub gated: bool,
}

impl FeatureFlags {
    /// Builds flags from flag tokens, ignoring anything unrecognized.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let mut flags = Self::default();
        for token in tokens {
            match token {
                "always" => flags.always = true,
                "gated" => flags.gated = true,
                _ => {}
            }
        }
        flags
    }

    /// Combines two flag sets; a flag set anywhere stays set.
    pub fn merge(self, other: Self) -> Self {
        Self {
            always: self.always || other.always,
            gated: self.gated || other.gated,
        }
    }
}

/// A single requested feature: a polyfill or alias name plus flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRequest {
    pub name: String,
    pub flags: FeatureFlags,
}

impl FeatureRequest {
    /// Creates a request with default flags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: FeatureFlags::default(),
        }
    }

    /// Sets the flags for this request.
    pub fn with_flags(mut self, flags: FeatureFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Policy for requests whose user agent could not be recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownPolicy {
    /// Serve every requested polyfill, gated behind feature detection.
    #[default]
    Polyfill,
    /// Serve nothing.
    Ignore,
}

impl UnknownPolicy {
    /// Parses the `unknown` parameter value; None for unrecognized input.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "polyfill" => Some(UnknownPolicy::Polyfill),
            "ignore" => Some(UnknownPolicy::Ignore),
            _ => None,
        }
    }

    fn key(&self) -> &'static str {
        match self {
            UnknownPolicy::Polyfill => "polyfill",
            UnknownPolicy::Ignore => "ignore",
        }
    }
}

/// Everything that affects the text of a generated bundle.
#[derive(Debug, Clone)]
pub struct BundleOptions {
    /// Requested features, in request order.
    pub features: Vec<FeatureRequest>,
    /// Concrete polyfill names to drop after expansion.
    pub excludes: Vec<String>,
    /// The parsed requesting user agent.
    pub user_agent: UserAgent,
    /// What to do when the user agent is unrecognized.
    pub unknown: UnknownPolicy,
    /// Emit the compact form (no banner, no per-feature comments).
    pub minify: bool,
    /// JSONP callback to invoke once the bundle has run.
    pub callback: Option<String>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            features: vec![FeatureRequest::new("default")],
            excludes: Vec::new(),
            user_agent: UserAgent::Unknown,
            unknown: UnknownPolicy::default(),
            minify: false,
            callback: None,
        }
    }
}

impl BundleOptions {
    /// Deterministic cache key covering every input that affects output.
    pub fn cache_key(&self) -> String {
        let mut key = String::from("features=");
        for (i, request) in self.features.iter().enumerate() {
            if i > 0 {
                key.push(',');
            }
            key.push_str(&request.name);
            if request.flags.always {
                key.push_str("|always");
            }
            if request.flags.gated {
                key.push_str("|gated");
            }
        }

        let mut excludes = self.excludes.clone();
        excludes.sort();
        let _ = write!(key, ";excludes={}", excludes.join(","));

        match &self.user_agent {
            UserAgent::Known { family, version } => {
                let _ = write!(key, ";ua={family}/{version}");
            }
            UserAgent::Unknown => key.push_str(";ua=unknown"),
        }

        let _ = write!(
            key,
            ";unknown={};min={}",
            self.unknown.key(),
            u8::from(self.minify)
        );
        if let Some(callback) = &self.callback {
            let _ = write!(key, ";cb={callback}");
        }
        key
    }
}
