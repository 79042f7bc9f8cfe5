//! Error types for meow
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Registry metadata errors
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Package (or the requested version) does not exist in the registry
    #[error("Package '{name}' not found in registry")]
    NotFound { name: String },

    /// Registry answered with a non-success status other than 404
    #[error("Registry returned HTTP {status} for '{name}'")]
    Http { name: String, status: u16 },

    /// Metadata was returned but lacks a version or tarball URL
    #[error("Package '{name}' does not have complete metadata: {detail}")]
    Incomplete { name: String, detail: String },

    /// No published version satisfies the requested range
    #[error("No version of '{name}' satisfies '{range}'")]
    NoMatchingVersion { name: String, range: String },

    /// Network-level failure talking to the registry
    #[error("Network error fetching metadata for '{name}': {error}")]
    Transport { name: String, error: String },
}

/// Integrity computation errors
#[derive(Error, Debug)]
pub enum IntegrityError {
    /// Artifact URL answered with a non-success status
    #[error("Failed to download tarball: HTTP {status} for {url}")]
    Fetch { url: String, status: u16 },

    /// DNS, connection, timeout or body stream failure
    #[error("Network error downloading '{url}': {error}")]
    Transport { url: String, error: String },

    /// Stored digest string is not `<algorithm>-<base64>`
    #[error("Malformed integrity string '{value}'")]
    Malformed { value: String },

    /// Stored digest names an algorithm we cannot compute
    #[error("Unsupported integrity algorithm '{algorithm}'")]
    UnsupportedAlgorithm { algorithm: String },
}

/// Package manager subprocess errors
#[derive(Error, Debug)]
pub enum SubprocessError {
    /// Binary is not on PATH
    #[error("'{program}' was not found on PATH")]
    NotFound { program: String },

    /// Process could not be started
    #[error("Failed to run '{program}': {error}")]
    Spawn { program: String, error: String },

    /// Process ran and exited unsuccessfully
    #[error("'{command}' exited with {status}: {diagnostics}")]
    Failed {
        command: String,
        status: String,
        diagnostics: String,
    },
}

/// Manifest (package.json) errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// No manifest where one is required
    #[error("No package.json found in {}", path.display())]
    Missing { path: PathBuf },

    /// Manifest exists but is unreadable or invalid
    #[error("Failed to parse '{}': {error}", path.display())]
    Parse { path: PathBuf, error: String },
}

/// Lock document errors
#[derive(Error, Debug)]
pub enum LockError {
    /// Lock file exists but is not a mapping of mappings
    #[error("Lock file '{}' is corrupt: {error}", path.display())]
    Corrupt { path: PathBuf, error: String },

    /// Lock file could not be written
    #[error("Failed to write lock file '{}': {error}", path.display())]
    Write { path: PathBuf, error: String },
}

/// Failure of a single requested package
///
/// Never aborts sibling packages in the same invocation.
#[derive(Error, Debug)]
pub enum PackageError {
    /// The requested spec could not be parsed
    #[error("Invalid package specification '{spec}': {reason}")]
    InvalidSpec { spec: String, reason: String },

    /// Registry lookup failed
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Digest computation failed
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

/// Errors that abort a whole reconciliation
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Manifest required but absent or invalid
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Lock file could not be persisted
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Mutually exclusive flags were combined
    #[error("Cannot use --global and --dev together")]
    GlobalWithDev,
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Global settings errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },

    /// Unknown package manager name
    #[error("Unknown package manager '{0}' (expected npm, yarn or pnpm)")]
    UnknownPackageManager(String),
}
