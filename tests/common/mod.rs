//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test project context
///
/// Creates a temporary project directory plus an isolated config directory
/// so the user's global settings never leak into a test.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
    /// Temporary config directory (`MEOW_CONFIG_DIR`)
    pub config_dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            config_dir: TempDir::new().expect("Failed to create config directory"),
        }
    }

    /// Create a project with a package.json
    pub fn with_manifest(content: &str) -> Self {
        let project = Self::new();
        project.create_file("package.json", content);
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Parse deps.neko
    pub fn lock(&self) -> serde_yaml::Value {
        serde_yaml::from_str(&self.read_file("deps.neko")).expect("deps.neko is not YAML")
    }

    /// Run meow in the project against `registry`, never invoking a
    /// package manager
    pub fn run(&self, registry: Option<&str>, args: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_meow"));
        cmd.current_dir(self.dir.path())
            .env("MEOW_CONFIG_DIR", self.config_dir.path())
            .env_remove("MEOW_REGISTRY")
            .env_remove("MEOW_PACKAGE_MANAGER")
            .env_remove("RUST_LOG")
            .arg("--no-install");
        if let Some(url) = registry {
            cmd.args(["--registry", url]);
        }
        cmd.args(args);
        cmd.output().expect("Failed to execute meow")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Body served as the tarball of `name@version`
pub fn tarball_body(name: &str, version: &str) -> Vec<u8> {
    format!("tarball of {name}@{version}").into_bytes()
}

/// Serve `GET /{name}/{version}` and its tarball
pub async fn publish(server: &MockServer, name: &str, version: &str) {
    let tarball = format!("/{name}/-/{name}-{version}.tgz");
    Mock::given(method("GET"))
        .and(path(format!("/{name}/{version}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": name,
            "version": version,
            "dist": {"tarball": format!("{}{tarball}", server.uri())}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(tarball))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(tarball_body(name, version)))
        .mount(server)
        .await;
}

/// Lock file contents with one runtime entry
pub fn lock_with_entry(name: &str, version: &str, resolved: &str, integrity: &str) -> String {
    format!(
        "# Neko-CLI package lock file\n\
         # This file tracks installed package versions and integrity.\n\
         dependencies:\n  {name}:\n    version: {version}\n    resolved: {resolved}\n    integrity: {integrity}\n\
         devDependencies: {{}}\n"
    )
}

/// `sha512-<base64>` of `data`
pub fn sha512_integrity(data: &[u8]) -> String {
    use base64::Engine;
    use sha2::{Digest, Sha512};

    let digest = Sha512::digest(data);
    format!(
        "sha512-{}",
        base64::engine::general_purpose::STANDARD.encode(digest)
    )
}
