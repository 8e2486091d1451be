use thiserror::Error;

/// Errors that can occur when validating or traversing the catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Polyfill {polyfill} depends on unknown polyfill {dependency}")]
    UnknownDependency {
        polyfill: String,
        dependency: String,
    },
    #[error("Alias {alias} refers to unknown feature {member}")]
    UnknownAliasMember { alias: String, member: String },
    #[error("Dependency cycle involving {0}")]
    DependencyCycle(String),
}
