//! Bundle generation: turning a feature request into JavaScript text.

pub mod error;
pub mod generate;
pub mod types;

pub use error::BundleError;
pub use generate::generate;
pub use types::{BundleOptions, FeatureFlags, FeatureRequest, UnknownPolicy};
