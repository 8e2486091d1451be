//! Deterministic dependency ordering for bundle assembly.
//!
//! Pure functions over the catalog: no side effects, no I/O. The ordering
//! is stable for identical inputs, which keeps generated bundles
//! cache-keyable.

use std::collections::BTreeSet;

use super::catalog::Catalog;
use super::error::CatalogError;

/// Orders the given polyfill names so every polyfill precedes its
/// dependents.
///
/// Dependencies reachable from the input set are added to the result even
/// when they were not requested themselves. Names that are not polyfills
/// are skipped. Ties are broken alphabetically (the input set iterates in
/// sorted order and each dependency list is visited depth-first).
pub fn dependency_order(
    catalog: &Catalog,
    names: &BTreeSet<String>,
) -> Result<Vec<String>, CatalogError> {
    let mut ordered = Vec::new();
    let mut visiting = BTreeSet::new();
    let mut visited = BTreeSet::new();

    for name in names {
        visit(catalog, name, &mut visiting, &mut visited, &mut ordered)?;
    }

    Ok(ordered)
}

fn visit(
    catalog: &Catalog,
    name: &str,
    visiting: &mut BTreeSet<String>,
    visited: &mut BTreeSet<String>,
    ordered: &mut Vec<String>,
) -> Result<(), CatalogError> {
    if visited.contains(name) {
        return Ok(());
    }
    if !visiting.insert(name.to_string()) {
        return Err(CatalogError::DependencyCycle(name.to_string()));
    }

    let Some(polyfill) = catalog.polyfill(name) else {
        visiting.remove(name);
        return Ok(());
    };

    for dependency in &polyfill.dependencies {
        visit(catalog, dependency, visiting, visited, ordered)?;
    }

    visiting.remove(name);
    visited.insert(name.to_string());
    ordered.push(name.to_string());
    Ok(())
}
