//! Lock document handling
//!
//! The lock document (`deps.neko`) records, for every runtime and dev
//! dependency, the exact version installed, the tarball it came from and the
//! integrity digest of that tarball.
//!
//! On disk it is a fixed two-line comment header followed by a YAML mapping
//! with exactly two keys, `dependencies` and `devDependencies`. Both mappings
//! keep insertion order so the file is stable for a given sequence of edits.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::defaults::LOCK_HEADER;
use crate::error::LockError;
use crate::infra::filesystem;

/// Which mapping of the lock document an entry lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    /// `dependencies`
    Runtime,
    /// `devDependencies`
    Dev,
}

impl DependencyKind {
    /// Map an `is_dev` flag onto a kind
    pub fn from_dev(is_dev: bool) -> Self {
        if is_dev {
            Self::Dev
        } else {
            Self::Runtime
        }
    }

    /// The other mapping
    pub fn other(self) -> Self {
        match self {
            Self::Runtime => Self::Dev,
            Self::Dev => Self::Runtime,
        }
    }

    /// Key used in the serialized document
    pub fn section_name(self) -> &'static str {
        match self {
            Self::Runtime => "dependencies",
            Self::Dev => "devDependencies",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_name())
    }
}

/// A single locked package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockEntry {
    /// Exact resolved version
    pub version: String,

    /// Tarball URL the version was fetched from
    #[serde(rename = "resolved")]
    pub resolved_url: String,

    /// `<algorithm>-<base64 digest>` of the bytes at `resolved_url`
    pub integrity: String,
}

impl LockEntry {
    /// Create an entry. `integrity` must be the digest of `resolved_url`.
    pub fn new(
        version: impl Into<String>,
        resolved_url: impl Into<String>,
        integrity: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            resolved_url: resolved_url.into(),
            integrity: integrity.into(),
        }
    }
}

/// In-memory lock document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LockDocument {
    /// Runtime dependencies
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dependencies: IndexMap<String, LockEntry>,

    /// Development dependencies
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dev_dependencies: IndexMap<String, LockEntry>,
}

/// Result of [`LockDocument::load`]
#[derive(Debug)]
pub struct LoadedLock {
    /// The document, empty if the file was absent or corrupt
    pub document: LockDocument,
    /// Whether a file was present on disk
    pub existed: bool,
    /// Set when the file was present but unusable and has been reset
    pub warning: Option<LockError>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<IndexMap<String, LockEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<IndexMap<String, LockEntry>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl LockDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the lock document inside a project directory
    pub fn path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(crate::config::defaults::LOCK_FILE_NAME)
    }

    /// Parse document text (header comments included)
    ///
    /// A body containing nothing but comments and whitespace is an empty
    /// document.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        let has_body = content
            .lines()
            .map(str::trim)
            .any(|line| !line.is_empty() && !line.starts_with('#'));
        if !has_body {
            return Ok(Self::new());
        }
        serde_yaml::from_str(content)
    }

    /// Serialize to document text, header included
    pub fn render(&self) -> Result<String, serde_yaml::Error> {
        let body = serde_yaml::to_string(self)?;
        Ok(format!("{LOCK_HEADER}{body}"))
    }

    /// Read the lock document at `path`
    ///
    /// Never fails: an absent file yields an empty document, and an
    /// unreadable or malformed file yields an empty document plus a warning.
    pub fn load(path: &Path) -> LoadedLock {
        if !path.exists() {
            tracing::debug!("{} not found, starting empty", path.display());
            return LoadedLock {
                document: Self::new(),
                existed: false,
                warning: None,
            };
        }

        let parsed = filesystem::read_file(path)
            .map_err(|e| e.to_string())
            .and_then(|content| Self::parse(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(document) => LoadedLock {
                document,
                existed: true,
                warning: None,
            },
            Err(error) => {
                tracing::warn!("{} is invalid, reinitializing: {error}", path.display());
                LoadedLock {
                    document: Self::new(),
                    existed: true,
                    warning: Some(LockError::Corrupt {
                        path: path.to_path_buf(),
                        error,
                    }),
                }
            }
        }
    }

    /// Rewrite the lock document at `path` in full
    pub fn save(&self, path: &Path) -> Result<(), LockError> {
        let content = self.render().map_err(|e| LockError::Write {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        filesystem::write_atomic(path, &content).map_err(|e| LockError::Write {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }

    /// Borrow one mapping
    pub fn section(&self, kind: DependencyKind) -> &IndexMap<String, LockEntry> {
        match kind {
            DependencyKind::Runtime => &self.dependencies,
            DependencyKind::Dev => &self.dev_dependencies,
        }
    }

    fn section_mut(&mut self, kind: DependencyKind) -> &mut IndexMap<String, LockEntry> {
        match kind {
            DependencyKind::Runtime => &mut self.dependencies,
            DependencyKind::Dev => &mut self.dev_dependencies,
        }
    }

    /// Insert or overwrite `name` in the `kind` mapping
    ///
    /// Any entry for `name` in the other mapping is dropped, so a name is
    /// never present in both.
    pub fn upsert(&mut self, name: &str, entry: LockEntry, kind: DependencyKind) {
        self.section_mut(kind.other()).shift_remove(name);
        self.section_mut(kind).insert(name.to_string(), entry);
    }

    /// Delete `name` from the `kind` mapping, returning the removed entry
    pub fn remove(&mut self, name: &str, kind: DependencyKind) -> Option<LockEntry> {
        self.section_mut(kind).shift_remove(name)
    }

    /// Find `name` in either mapping
    pub fn get(&self, name: &str) -> Option<(DependencyKind, &LockEntry)> {
        [DependencyKind::Runtime, DependencyKind::Dev]
            .into_iter()
            .find_map(|kind| self.section(kind).get(name).map(|e| (kind, e)))
    }

    /// All entries, runtime first, each mapping in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (DependencyKind, &str, &LockEntry)> {
        [DependencyKind::Runtime, DependencyKind::Dev]
            .into_iter()
            .flat_map(move |kind| {
                self.section(kind)
                    .iter()
                    .map(move |(n, e)| (kind, n.as_str(), e))
            })
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.dependencies.len() + self.dev_dependencies.len()
    }

    /// Whether both mappings are empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::generators::{integrity, package_name, semver_version, url};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn entry(version: &str) -> LockEntry {
        LockEntry::new(
            version,
            format!("https://registry.npmjs.org/left-pad/-/left-pad-{version}.tgz"),
            "sha512-AAAA",
        )
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let loaded = LockDocument::load(&temp.path().join("deps.neko"));

        assert!(loaded.document.is_empty());
        assert!(!loaded.existed);
        assert!(loaded.warning.is_none());
    }

    #[test]
    fn test_load_plain_text_is_corrupt_and_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("deps.neko");
        std::fs::write(&path, "not a valid document").unwrap();

        let loaded = LockDocument::load(&path);

        assert!(loaded.document.is_empty());
        assert!(loaded.existed);
        assert!(matches!(loaded.warning, Some(LockError::Corrupt { .. })));
    }

    #[test]
    fn test_load_wrong_shape_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("deps.neko");
        std::fs::write(&path, "dependencies:\n  - left-pad\n  - chalk\n").unwrap();

        let loaded = LockDocument::load(&path);

        assert!(loaded.document.is_empty());
        assert!(loaded.warning.is_some());
    }

    #[test]
    fn test_parse_header_only_is_empty() {
        let doc = LockDocument::parse(LOCK_HEADER).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_parse_null_sections() {
        let doc = LockDocument::parse("dependencies:\ndevDependencies:\n").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_parse_init_template() {
        let content = format!("{LOCK_HEADER}dependencies: {{}}\ndevDependencies: {{}}\n");
        let doc = LockDocument::parse(&content).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_render_starts_with_header_and_uses_resolved_key() {
        let mut doc = LockDocument::new();
        doc.upsert("left-pad", entry("1.0.0"), DependencyKind::Runtime);

        let text = doc.render().unwrap();

        assert!(text.starts_with(LOCK_HEADER));
        assert!(text.contains("resolved:"));
        assert!(text.contains("devDependencies:"));
        assert!(!text.contains("resolved_url"));
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("deps.neko");
        let mut doc = LockDocument::new();
        doc.upsert("left-pad", entry("1.0.0"), DependencyKind::Runtime);
        doc.upsert("jest", entry("29.7.0"), DependencyKind::Dev);

        doc.save(&path).unwrap();
        let loaded = LockDocument::load(&path);

        assert!(loaded.warning.is_none());
        assert_eq!(loaded.document, doc);
    }

    #[test]
    fn test_upsert_moves_between_sections() {
        let mut doc = LockDocument::new();
        doc.upsert("left-pad", entry("1.0.0"), DependencyKind::Runtime);
        doc.upsert("left-pad", entry("1.1.0"), DependencyKind::Dev);

        assert!(doc.dependencies.is_empty());
        assert_eq!(doc.dev_dependencies["left-pad"].version, "1.1.0");
        assert_eq!(doc.get("left-pad").unwrap().0, DependencyKind::Dev);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut doc = LockDocument::new();
        doc.upsert("left-pad", entry("1.0.0"), DependencyKind::Runtime);
        let before = doc.clone();

        assert!(doc.remove("chalk", DependencyKind::Runtime).is_none());
        assert!(doc.remove("left-pad", DependencyKind::Dev).is_none());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut doc = LockDocument::new();
        for name in ["zeta", "alpha", "mid"] {
            doc.upsert(name, entry("1.0.0"), DependencyKind::Runtime);
        }
        doc.remove("alpha", DependencyKind::Runtime);
        doc.upsert("zeta", entry("2.0.0"), DependencyKind::Runtime);

        let names: Vec<_> = doc.dependencies.keys().cloned().collect();
        assert_eq!(names, vec!["zeta", "mid"]);
    }

    #[test]
    fn test_entries_list_runtime_before_dev() {
        let mut doc = LockDocument::new();
        doc.upsert("jest", entry("29.7.0"), DependencyKind::Dev);
        doc.upsert("chalk", entry("5.3.0"), DependencyKind::Runtime);
        doc.upsert("left-pad", entry("1.0.0"), DependencyKind::Runtime);

        let listed: Vec<_> = doc.entries().map(|(kind, name, _)| (kind, name)).collect();
        assert_eq!(
            listed,
            vec![
                (DependencyKind::Runtime, "chalk"),
                (DependencyKind::Runtime, "left-pad"),
                (DependencyKind::Dev, "jest"),
            ]
        );
        assert_eq!(doc.get("jest").unwrap().1.version, "29.7.0");
        assert!(doc.get("react").is_none());
    }

    fn lock_entry() -> impl Strategy<Value = LockEntry> {
        (semver_version(), url(), integrity())
            .prop_map(|(version, url, integrity)| LockEntry::new(version, url, integrity))
    }

    fn operation() -> impl Strategy<Value = (bool, String, LockEntry, bool)> {
        (any::<bool>(), package_name(), lock_entry(), any::<bool>())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Saving then loading yields the same document
        #[test]
        fn prop_round_trip(
            runtime in proptest::collection::vec((package_name(), lock_entry()), 1..8),
            dev in proptest::collection::vec((package_name(), lock_entry()), 1..8),
        ) {
            let mut doc = LockDocument::new();
            for (name, e) in runtime {
                doc.upsert(&name, e, DependencyKind::Runtime);
            }
            for (name, e) in dev {
                doc.upsert(&name, e, DependencyKind::Dev);
            }

            let text = doc.render().unwrap();
            let parsed = LockDocument::parse(&text).unwrap();
            prop_assert_eq!(parsed, doc);
        }

        /// Upserting twice equals upserting once
        #[test]
        fn prop_upsert_idempotent(name in package_name(), e in lock_entry(), dev in any::<bool>()) {
            let kind = DependencyKind::from_dev(dev);
            let mut once = LockDocument::new();
            once.upsert(&name, e.clone(), kind);
            let mut twice = once.clone();
            twice.upsert(&name, e, kind);
            prop_assert_eq!(once, twice);
        }

        /// No name is ever in both mappings
        #[test]
        fn prop_mutual_exclusion(ops in proptest::collection::vec(operation(), 0..40)) {
            let mut doc = LockDocument::new();
            for (is_upsert, name, e, dev) in ops {
                let kind = DependencyKind::from_dev(dev);
                if is_upsert {
                    doc.upsert(&name, e, kind);
                } else {
                    doc.remove(&name, kind);
                }
                for name in doc.dependencies.keys() {
                    prop_assert!(!doc.dev_dependencies.contains_key(name));
                }
            }
        }
    }
}
