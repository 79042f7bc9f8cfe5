//! Infrastructure layer
//!
//! Handles I/O operations: network, filesystem, and external processes.

pub mod dirs;
pub mod filesystem;
pub mod http;
pub mod integrity;
pub mod package_manager;
