use thiserror::Error;

use crate::features::CatalogError;

/// Errors that can occur while generating a bundle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BundleError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_catalog_error_display() {
        let error = BundleError::from(CatalogError::DependencyCycle("Symbol".to_string()));
        assert_eq!(error.to_string(), "Dependency cycle involving Symbol");
    }
}
