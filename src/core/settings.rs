//! Global settings
//!
//! Reads `config.toml` from the config directory. Settings here are the
//! lowest-priority layer: command-line flags and their environment variables
//! are applied on top with [`Settings::with_overrides`].
//!
//! ```toml
//! registry = "https://registry.npmjs.org"
//! package_manager = "pnpm"
//!
//! [http]
//! timeout_secs = 120
//! connect_timeout_secs = 10
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{defaults, urls};
use crate::error::SettingsError;
use crate::infra::dirs::MeowDirs;
use crate::infra::package_manager::PackageManagerKind;

/// Global settings for meow
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Registry base URL
    pub registry: Option<String>,

    /// Package manager to use instead of lock-file detection
    pub package_manager: Option<PackageManagerKind>,

    /// HTTP settings
    #[serde(default)]
    pub http: HttpSettings,
}

/// HTTP client settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpSettings {
    /// Whole-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Connect timeout in seconds
    pub connect_timeout_secs: Option<u64>,
}

impl Settings {
    /// Load settings from the config directory
    pub fn load(dirs: &MeowDirs) -> Result<Self, SettingsError> {
        Self::load_from_path(&dirs.settings_path())
    }

    /// Load settings from a specific path
    ///
    /// A missing file yields defaults; an invalid one is an error.
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SettingsError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Apply higher-priority values (flags / environment)
    #[must_use]
    pub fn with_overrides(
        mut self,
        registry: Option<String>,
        package_manager: Option<PackageManagerKind>,
    ) -> Self {
        if registry.is_some() {
            self.registry = registry;
        }
        if package_manager.is_some() {
            self.package_manager = package_manager;
        }
        self
    }

    /// Effective registry URL
    pub fn registry_url(&self) -> &str {
        self.registry.as_deref().unwrap_or(urls::NPM_REGISTRY)
    }

    /// Effective request timeout
    pub fn timeout_secs(&self) -> u64 {
        self.http.timeout_secs.unwrap_or(defaults::HTTP_TIMEOUT_SECS)
    }

    /// Effective connect timeout
    pub fn connect_timeout_secs(&self) -> u64 {
        self.http
            .connect_timeout_secs
            .unwrap_or(defaults::HTTP_CONNECT_TIMEOUT_SECS)
    }

    /// Configured package manager, or the one detected in `project_dir`
    pub fn package_manager_for(&self, project_dir: &Path) -> PackageManagerKind {
        self.package_manager
            .unwrap_or_else(|| PackageManagerKind::detect(project_dir))
    }
}
