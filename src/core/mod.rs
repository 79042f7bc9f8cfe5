//! Core business logic module
//!
//! Lock document model, spec and range parsing, and reconciliation.
//! Network and subprocess access goes through [`crate::registry`] and
//! [`crate::infra`].
//!
//! # Submodules
//!
//! - [`lock`] - `deps.neko` document model, load and save
//! - [`manifest`] - `package.json` dependency declarations
//! - [`package_spec`] - Command-line package spec parsing
//! - [`range`] - npm version range matching
//! - [`reconcile`] - Add, remove and install-all
//! - [`progress`] - Progress reporting capability
//! - [`settings`] - Global settings

pub mod lock;
pub mod manifest;
pub mod package_spec;
pub mod progress;
pub mod range;
pub mod reconcile;
pub mod settings;
