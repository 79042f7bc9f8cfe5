//! Package registry
//!
//! Fetches version metadata from an npm-compatible registry.

pub mod client;
