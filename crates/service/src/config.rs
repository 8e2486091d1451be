use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Route prefix for the polyfill endpoints (default: none)
    pub context_path: String,
    /// Maximum number of cached bundles (default: 1,000)
    pub bundle_cache_max_entries: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CONTEXT_PATH` - Optional prefix for the polyfill routes (e.g. "/api")
    /// - `BUNDLE_CACHE_MAX_ENTRIES` - Maximum cached bundles (default: 1,000)
    pub fn from_env() -> Self {
        Self {
            context_path: normalize_context_path(&env::var("CONTEXT_PATH").unwrap_or_default()),
            bundle_cache_max_entries: env::var("BUNDLE_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1_000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Normalizes a context path: empty stays empty, anything else gets a
/// leading `/` and loses trailing ones.
fn normalize_context_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
