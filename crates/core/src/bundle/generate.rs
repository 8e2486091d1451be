//! Assembles the JavaScript bundle for a resolved set of polyfills.
//!
//! The pipeline: expand requested features through the catalog, apply
//! excludes, filter by user-agent targeting, close over dependencies in
//! topological order, then emit. Output is deterministic for identical
//! options, so the service can cache it by `BundleOptions::cache_key`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use super::error::BundleError;
use super::types::{BundleOptions, FeatureFlags, UnknownPolicy};
use crate::features::toposort::dependency_order;
use crate::features::Catalog;

/// Generates the bundle text for the given options.
///
/// Unknown feature names expand to nothing; rejecting them is the
/// route's strict-mode concern, not the generator's.
pub fn generate(catalog: &Catalog, options: &BundleOptions) -> Result<String, BundleError> {
    // Expand requests through aliases, merging flags on collision.
    let mut flags_by_name: BTreeMap<String, FeatureFlags> = BTreeMap::new();
    for request in &options.features {
        for name in catalog.expand(&request.name) {
            let entry = flags_by_name.entry(name).or_default();
            *entry = entry.merge(request.flags);
        }
    }

    for exclude in &options.excludes {
        flags_by_name.remove(exclude);
    }

    // Unrecognized agents either get everything (gated) or nothing.
    let unknown_gets_everything =
        options.user_agent.is_unknown() && options.unknown == UnknownPolicy::Polyfill;

    let targeted: BTreeSet<String> = flags_by_name
        .iter()
        .filter(|(name, flags)| {
            flags.always
                || unknown_gets_everything
                || catalog
                    .polyfill(name)
                    .is_some_and(|p| p.required_for(&options.user_agent))
        })
        .map(|(name, _)| name.clone())
        .collect();

    let ordered = dependency_order(catalog, &targeted)?;

    let mut output = String::new();

    if options.minify {
        output.push_str("/* Disable minification (remove `.min` from URL path) for more info */\n");
    } else {
        let requested: Vec<&str> = options
            .features
            .iter()
            .map(|request| request.name.as_str())
            .collect();
        let _ = writeln!(output, "/* Polyfill service");
        let _ = writeln!(output, " * Features requested: {}", requested.join(","));
        let _ = writeln!(output, " * Polyfills included: {} */", ordered.join(", "));
    }

    if ordered.is_empty() {
        if !options.minify {
            output.push_str("\n/* No polyfills needed for the requesting user agent */\n");
        }
        append_callback(&mut output, options);
        return Ok(output);
    }

    if options.minify {
        output.push_str("(function(self){");
    } else {
        output.push_str("\n(function (self) {\n");
    }

    for name in &ordered {
        let Some(polyfill) = catalog.polyfill(name) else {
            continue;
        };
        let flags = flags_by_name.get(name).copied().unwrap_or_default();
        let gate = polyfill
            .detect
            .as_deref()
            .filter(|_| flags.gated || unknown_gets_everything);

        if options.minify {
            match gate {
                Some(detect) => {
                    let _ = write!(output, "if(!({detect})){{{}}}", polyfill.source);
                }
                None => output.push_str(&polyfill.source),
            }
            output.push('\n');
        } else {
            let _ = write!(output, "\n/* {name} */\n");
            match gate {
                Some(detect) => {
                    let _ = writeln!(output, "if (!({detect})) {{");
                    output.push_str(&polyfill.source);
                    output.push_str("\n}\n");
                }
                None => {
                    output.push_str(&polyfill.source);
                    output.push('\n');
                }
            }
        }
    }

    if options.minify {
        output.push_str("}(typeof self !== 'undefined' ? self : this));\n");
    } else {
        output.push_str(
            "\n}(typeof self !== 'undefined' ? self : typeof global !== 'undefined' ? global : this));\n",
        );
    }

    append_callback(&mut output, options);
    Ok(output)
}

fn append_callback(output: &mut String, options: &BundleOptions) {
    if let Some(callback) = &options.callback {
        let _ = writeln!(
            output,
            "typeof {callback} === 'function' && {callback}();"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::types::FeatureRequest;
    use crate::ua::{Family, UserAgent, Version};

    fn ua(family: Family, major: u32) -> UserAgent {
        UserAgent::Known {
            family,
            version: Version::new(major, 0),
        }
    }

    fn options_for(features: &[&str], user_agent: UserAgent) -> BundleOptions {
        BundleOptions {
            features: features.iter().map(|name| FeatureRequest::new(*name)).collect(),
            user_agent,
            ..BundleOptions::default()
        }
    }

    #[test]
    fn test_old_browser_gets_polyfills() {
        let catalog = Catalog::builtin();
        let options = options_for(&["es2015"], ua(Family::Ie, 11));
        let bundle = generate(&catalog, &options).unwrap();

        assert!(bundle.contains("/* Promise */"));
        assert!(bundle.contains("self.Promise"));
        assert!(bundle.contains("Object.defineProperty(Object, 'assign'"));
    }

    #[test]
    fn test_modern_browser_gets_empty_bundle() {
        let catalog = Catalog::builtin();
        let options = options_for(&["default"], ua(Family::Chrome, 114));
        let bundle = generate(&catalog, &options).unwrap();

        assert!(bundle.contains("No polyfills needed"));
        assert!(!bundle.contains("self.Promise"));
        assert!(!bundle.is_empty());
    }

    #[test]
    fn test_unknown_agent_polyfill_policy_gates_everything() {
        let catalog = Catalog::builtin();
        let options = options_for(&["fetch"], UserAgent::Unknown);
        let bundle = generate(&catalog, &options).unwrap();

        assert!(bundle.contains("if (!('fetch' in self))"));
        assert!(bundle.contains("if (!('Promise' in self))"));
    }

    #[test]
    fn test_unknown_agent_ignore_policy_serves_nothing() {
        let catalog = Catalog::builtin();
        let mut options = options_for(&["fetch"], UserAgent::Unknown);
        options.unknown = UnknownPolicy::Ignore;
        let bundle = generate(&catalog, &options).unwrap();

        assert!(!bundle.contains("self.fetch"));
        assert!(bundle.contains("No polyfills needed"));
    }

    #[test]
    fn test_always_flag_overrides_targeting() {
        let catalog = Catalog::builtin();
        let mut options = options_for(&[], ua(Family::Chrome, 114));
        options.features = vec![FeatureRequest::new("fetch").with_flags(FeatureFlags {
            always: true,
            gated: false,
        })];
        let bundle = generate(&catalog, &options).unwrap();

        assert!(bundle.contains("self.fetch"));
    }

    #[test]
    fn test_gated_flag_wraps_in_detect() {
        let catalog = Catalog::builtin();
        let mut options = options_for(&[], ua(Family::Ie, 11));
        options.features = vec![FeatureRequest::new("fetch").with_flags(FeatureFlags {
            always: false,
            gated: true,
        })];
        let bundle = generate(&catalog, &options).unwrap();

        assert!(bundle.contains("if (!('fetch' in self))"));
    }

    #[test]
    fn test_known_agent_without_gated_emits_bare_source() {
        let catalog = Catalog::builtin();
        let options = options_for(&["fetch"], ua(Family::Ie, 11));
        let bundle = generate(&catalog, &options).unwrap();

        assert!(bundle.contains("self.fetch"));
        assert!(!bundle.contains("if (!('fetch' in self))"));
    }

    #[test]
    fn test_excludes_drop_expanded_features() {
        let catalog = Catalog::builtin();
        let mut options = options_for(&["es2015"], ua(Family::Ie, 11));
        options.excludes = vec!["Promise".to_string()];
        let bundle = generate(&catalog, &options).unwrap();

        assert!(!bundle.contains("/* Promise */"));
        assert!(bundle.contains("/* Symbol */"));
    }

    #[test]
    fn test_dependencies_emitted_first() {
        let catalog = Catalog::builtin();
        let options = options_for(&["fetch"], ua(Family::Ie, 11));
        let bundle = generate(&catalog, &options).unwrap();

        let promise = bundle.find("/* Promise */").unwrap();
        let fetch = bundle.find("/* fetch */").unwrap();
        assert!(promise < fetch);
    }

    #[test]
    fn test_callback_appended() {
        let catalog = Catalog::builtin();
        let mut options = options_for(&["fetch"], ua(Family::Ie, 11));
        options.callback = Some("ready".to_string());
        let bundle = generate(&catalog, &options).unwrap();

        assert!(bundle.ends_with("typeof ready === 'function' && ready();\n"));
    }

    #[test]
    fn test_minified_output_is_compact() {
        let catalog = Catalog::builtin();
        let mut options = options_for(&["fetch"], UserAgent::Unknown);
        options.minify = true;
        let bundle = generate(&catalog, &options).unwrap();

        assert!(bundle.starts_with("/* Disable minification"));
        assert!(!bundle.contains("/* fetch */"));
        assert!(bundle.contains("if(!('fetch' in self))"));
    }

    #[test]
    fn test_deterministic_output() {
        let catalog = Catalog::builtin();
        let options = options_for(&["default"], ua(Family::Ie, 9));
        let a = generate(&catalog, &options).unwrap();
        let b = generate(&catalog, &options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_feature_names_are_dropped() {
        let catalog = Catalog::builtin();
        let options = options_for(&["fetch", "no-such-feature"], ua(Family::Ie, 11));
        let bundle = generate(&catalog, &options).unwrap();

        assert!(bundle.contains("self.fetch"));
        assert!(!bundle.contains("no-such-feature */"));
    }
}
