use thiserror::Error;

/// Errors that can occur when parsing versions or version ranges.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version: {0}")]
    InvalidVersion(String),
    #[error("Invalid version range: {0}")]
    InvalidRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_error_display() {
        assert_eq!(
            VersionError::InvalidVersion("abc".to_string()).to_string(),
            "Invalid version: abc"
        );
        assert_eq!(
            VersionError::InvalidRange(">>4".to_string()).to_string(),
            "Invalid version range: >>4"
        );
    }
}
