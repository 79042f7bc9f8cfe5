//! Manifest (package.json) reading
//!
//! Only the `dependencies` and `devDependencies` maps are consulted. The
//! manifest is read-only input; it is never written back.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::config::defaults::MANIFEST_FILE_NAME;
use crate::core::lock::DependencyKind;
use crate::error::ManifestError;
use crate::infra::filesystem;

/// Dependency declarations of a project manifest
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Runtime dependencies: name → version range
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,

    /// Development dependencies: name → version range
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, String>,
}

/// A dependency declared in the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub name: String,
    pub version_range: String,
    pub kind: DependencyKind,
}

impl Manifest {
    /// Path of the manifest inside a project directory
    pub fn path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(MANIFEST_FILE_NAME)
    }

    /// Parse manifest JSON
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load the manifest at `path`
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::Missing {
                path: path.parent().unwrap_or(path).to_path_buf(),
            });
        }
        let content = filesystem::read_file(path).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::from_json(&content).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// All declared dependencies, runtime first, in file order
    pub fn dependency_specs(&self) -> Vec<DependencySpec> {
        let runtime = self.dependencies.iter().map(|(name, range)| DependencySpec {
            name: name.clone(),
            version_range: range.clone(),
            kind: DependencyKind::Runtime,
        });
        let dev = self.dev_dependencies.iter().map(|(name, range)| DependencySpec {
            name: name.clone(),
            version_range: range.clone(),
            kind: DependencyKind::Dev,
        });
        runtime.chain(dev).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_both_sections() {
        let manifest = Manifest::from_json(
            r#"{
                "name": "demo",
                "version": "1.0.0",
                "dependencies": {"chalk": "^5.0.0", "left-pad": "1.3.0"},
                "devDependencies": {"jest": "^29.0.0"}
            }"#,
        )
        .unwrap();

        let specs = manifest.dependency_specs();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].name, "chalk");
        assert_eq!(specs[0].version_range, "^5.0.0");
        assert_eq!(specs[0].kind, DependencyKind::Runtime);
        assert_eq!(specs[1].name, "left-pad");
        assert_eq!(specs[2].name, "jest");
        assert_eq!(specs[2].kind, DependencyKind::Dev);
    }

    #[test]
    fn test_parse_without_dependencies() {
        let manifest = Manifest::from_json(r#"{"name": "demo"}"#).unwrap();
        assert!(manifest.dependency_specs().is_empty());
    }

    #[test]
    fn test_load_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let result = Manifest::load(&Manifest::path_in(temp.path()));
        assert!(matches!(result, Err(ManifestError::Missing { .. })));
    }

    #[test]
    fn test_load_invalid_manifest() {
        let temp = TempDir::new().unwrap();
        let path = Manifest::path_in(temp.path());
        std::fs::write(&path, "{ not json").unwrap();

        let result = Manifest::load(&path);
        assert!(matches!(result, Err(ManifestError::Parse { .. })));
    }
}
