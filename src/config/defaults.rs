//! Default configuration values

/// Lock document file name, relative to the project directory
pub const LOCK_FILE_NAME: &str = "deps.neko";

/// Manifest file name, relative to the project directory
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Fixed two-line comment header written at the top of every lock document
pub const LOCK_HEADER: &str =
    "# Neko-CLI package lock file\n# This file tracks installed package versions and integrity.\n";

/// Global config file name inside the config directory
pub const SETTINGS_FILE_NAME: &str = "config.toml";

/// Whole-request HTTP timeout (in seconds)
pub const HTTP_TIMEOUT_SECS: u64 = 300;

/// HTTP connect timeout (in seconds)
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Dist-tag used when a spec names no version
pub const DEFAULT_DIST_TAG: &str = "latest";
