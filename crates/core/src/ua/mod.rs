//! User-agent parsing and browser version targeting.
//!
//! Polyfill definitions carry per-browser version ranges; this module
//! provides the version/range types those ranges are expressed in, and a
//! parser that recognizes the common browser families from a raw
//! `User-Agent` header value.

pub mod error;
pub mod useragent;
pub mod version;

pub use error::VersionError;
pub use useragent::{Family, UserAgent};
pub use version::{Version, VersionRange};
