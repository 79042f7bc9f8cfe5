//! Meow - lock file reconciliation for npm, yarn and pnpm projects
//!
//! Keeps a `deps.neko` lock document in step with add, remove and
//! install-all requests: every locked package records its exact version,
//! tarball URL and a digest of the tarball bytes. Installing files on disk is
//! delegated to the project's package manager.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Lock document model and reconciliation
//! - [`registry`] - npm registry metadata client
//! - [`infra`] - Infrastructure layer (network, filesystem, processes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
pub mod registry;

#[cfg(test)]
pub mod test_utils;
