//! Platform-specific directory management
//!
//! Locates the global config directory. Follows the XDG Base Directory
//! Specification on Linux and standard locations on macOS.
//!
//! `MEOW_CONFIG_DIR` overrides the default location.

use std::env;
use std::path::PathBuf;

use crate::config::defaults::SETTINGS_FILE_NAME;

/// Environment variable overriding the config directory
pub const ENV_CONFIG_DIR: &str = "MEOW_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "meow";

/// Directory provider for meow
#[derive(Debug, Clone)]
pub struct MeowDirs {
    config_dir: PathBuf,
}

impl MeowDirs {
    /// Resolve directories from the environment, then platform defaults
    #[must_use]
    pub fn new() -> Self {
        Self::with_config_dir(Self::resolve_config_dir())
    }

    /// Use an explicit config directory
    #[must_use]
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/meow` or `~/.config/meow`
    /// - macOS: `~/Library/Application Support/meow`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Path of `config.toml` in the config directory
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE_NAME)
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for MeowDirs {
    fn default() -> Self {
        Self::new()
    }
}
