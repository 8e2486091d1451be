//! Core polyfill resolution library for the polyfill-service project.
//!
//! This crate knows nothing about HTTP. It owns the polyfill catalog
//! (feature definitions, alias groups, browser targeting data), user-agent
//! parsing, and bundle generation. The service crate layers request
//! parsing, compression and routing on top of it.

pub mod bundle;
pub mod features;
pub mod ua;
