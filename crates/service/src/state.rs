//! Shared application state.
//!
//! Cloned for each request handler. Cross-request state is limited to the
//! immutable catalog, the process-start `Last-Modified` value, and an LRU
//! cache of generated bundle text. Bundles are cached uncompressed so each
//! request applies its own content encoding.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use lru::LruCache;

use polyfill_core::bundle::{self, BundleError, BundleOptions};
use polyfill_core::features::Catalog;

use crate::config::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The polyfill catalog; immutable for the process lifetime.
    pub catalog: Arc<Catalog>,
    /// `Last-Modified` value shared by every bundle response, computed
    /// once at process start.
    pub last_modified: Arc<str>,
    /// Service configuration.
    pub config: Arc<Config>,
    /// Generated bundle text keyed by `BundleOptions::cache_key`.
    bundle_cache: Arc<Mutex<LruCache<String, Arc<String>>>>,
}

impl AppState {
    /// Creates the state for the given configuration.
    pub fn new(config: Config) -> Self {
        let capacity =
            NonZeroUsize::new(config.bundle_cache_max_entries).unwrap_or(NonZeroUsize::MIN);

        Self {
            catalog: Arc::new(Catalog::builtin()),
            last_modified: http_date_now().into(),
            config: Arc::new(config),
            bundle_cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Returns the bundle for the given options, generating on cache miss.
    pub fn bundle(&self, options: &BundleOptions) -> Result<Arc<String>, BundleError> {
        let key = options.cache_key();

        if let Some(bundle) = self
            .bundle_cache
            .lock()
            .expect("bundle cache lock poisoned")
            .get(&key)
        {
            tracing::trace!(%key, "Bundle cache hit");
            return Ok(bundle.clone());
        }

        let generated = Arc::new(bundle::generate(&self.catalog, options)?);
        self.bundle_cache
            .lock()
            .expect("bundle cache lock poisoned")
            .put(key, generated.clone());
        Ok(generated)
    }

    /// Number of cached bundles.
    pub fn bundle_cache_len(&self) -> usize {
        self.bundle_cache
            .lock()
            .expect("bundle cache lock poisoned")
            .len()
    }
}

/// Current time formatted as an HTTP date (RFC 7231 fixed GMT format).
fn http_date_now() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            context_path: String::new(),
            bundle_cache_max_entries: 10,
        }
    }

    #[test]
    fn test_last_modified_shared_across_clones() {
        let state = AppState::new(test_config());
        let clone = state.clone();
        assert_eq!(state.last_modified, clone.last_modified);
    }

    #[test]
    fn test_http_date_format() {
        let date = http_date_now();
        assert!(date.ends_with(" GMT"));
        // e.g. "Mon, 06 Jan 2025 12:00:00 GMT"
        assert_eq!(date.len(), 29);
    }

    #[test]
    fn test_bundle_cached_by_options() {
        let state = AppState::new(test_config());
        let options = BundleOptions::default();

        let first = state.bundle(&options).unwrap();
        let second = state.bundle(&options).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(state.bundle_cache_len(), 1);
    }

    #[test]
    fn test_distinct_options_cached_separately() {
        let state = AppState::new(test_config());
        let raw = BundleOptions::default();
        let minified = BundleOptions {
            minify: true,
            ..BundleOptions::default()
        };

        let a = state.bundle(&raw).unwrap();
        let b = state.bundle(&minified).unwrap();

        assert_ne!(a.as_str(), b.as_str());
        assert_eq!(state.bundle_cache_len(), 2);
    }

    #[test]
    fn test_cache_respects_capacity() {
        let state = AppState::new(Config {
            context_path: String::new(),
            bundle_cache_max_entries: 1,
        });

        let raw = BundleOptions::default();
        let minified = BundleOptions {
            minify: true,
            ..BundleOptions::default()
        };

        state.bundle(&raw).unwrap();
        state.bundle(&minified).unwrap();
        assert_eq!(state.bundle_cache_len(), 1);
    }
}
