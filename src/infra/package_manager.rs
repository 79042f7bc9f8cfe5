//! Package manager subprocess boundary
//!
//! The reconciler never touches `node_modules` itself. Installing and
//! uninstalling files is delegated to npm, yarn or pnpm through the
//! [`PackageManagerAdapter`] trait; [`CommandAdapter`] is the real
//! implementation that shells out.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SubprocessError};

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManagerKind {
    #[default]
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManagerKind {
    /// Executable name
    pub fn program(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
        }
    }

    /// Pick a package manager from the lock files present in `project_dir`
    ///
    /// `pnpm-lock.yaml` wins over `yarn.lock`; npm is the fallback.
    pub fn detect(project_dir: &Path) -> Self {
        if project_dir.join("pnpm-lock.yaml").exists() {
            Self::Pnpm
        } else if project_dir.join("yarn.lock").exists() {
            Self::Yarn
        } else {
            Self::Npm
        }
    }
}

impl fmt::Display for PackageManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for PackageManagerKind {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "npm" => Ok(Self::Npm),
            "yarn" => Ok(Self::Yarn),
            "pnpm" => Ok(Self::Pnpm),
            other => Err(SettingsError::UnknownPackageManager(other.to_string())),
        }
    }
}

/// Operation requested from the package manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Install,
    Uninstall,
}

/// Mode flags for a package manager invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstallFlags {
    /// Operate on the global package set
    pub global: bool,
    /// Record as a dev dependency
    pub dev: bool,
    /// Ask the package manager to keep quiet
    pub silent: bool,
}

/// Captured output of a successful invocation
#[derive(Debug, Clone, Default)]
pub struct PmOutput {
    /// Command line that was run
    pub command: String,
    pub stdout: String,
    pub stderr: String,
}

/// Capability to run a package manager
pub trait PackageManagerAdapter: Send + Sync {
    /// Human-readable name for messages
    fn name(&self) -> &str;

    /// Run `verb` for `packages` (`name@version` for installs, names for
    /// uninstalls)
    fn run(
        &self,
        verb: Verb,
        packages: &[String],
        flags: InstallFlags,
    ) -> Result<PmOutput, SubprocessError>;
}

/// Command-line arguments for one invocation
pub fn build_args(
    kind: PackageManagerKind,
    verb: Verb,
    packages: &[String],
    flags: InstallFlags,
) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();

    match kind {
        PackageManagerKind::Npm => {
            args.push(match verb {
                Verb::Install => "install".into(),
                Verb::Uninstall => "uninstall".into(),
            });
            args.extend(packages.iter().cloned());
            args.push(if flags.global {
                "--global".into()
            } else if flags.dev {
                "--save-dev".into()
            } else {
                "--save".into()
            });
        }
        PackageManagerKind::Yarn => {
            if flags.global {
                args.push("global".into());
            }
            args.push(match verb {
                Verb::Install => "add".into(),
                Verb::Uninstall => "remove".into(),
            });
            args.extend(packages.iter().cloned());
            if flags.dev && !flags.global && verb == Verb::Install {
                args.push("--dev".into());
            }
        }
        PackageManagerKind::Pnpm => {
            args.push(match verb {
                Verb::Install => "add".into(),
                Verb::Uninstall => "remove".into(),
            });
            args.extend(packages.iter().cloned());
            if flags.global {
                args.push("--global".into());
            } else if flags.dev {
                args.push("--save-dev".into());
            }
        }
    }

    if flags.silent {
        args.push("--silent".into());
    }
    args
}

/// Runs the real npm/yarn/pnpm binary in a project directory
#[derive(Debug, Clone)]
pub struct CommandAdapter {
    kind: PackageManagerKind,
    project_dir: PathBuf,
}

impl CommandAdapter {
    /// Create an adapter for `kind` operating in `project_dir`
    pub fn new(kind: PackageManagerKind, project_dir: &Path) -> Self {
        Self {
            kind,
            project_dir: project_dir.to_path_buf(),
        }
    }
}

impl PackageManagerAdapter for CommandAdapter {
    fn name(&self) -> &str {
        self.kind.program()
    }

    fn run(
        &self,
        verb: Verb,
        packages: &[String],
        flags: InstallFlags,
    ) -> Result<PmOutput, SubprocessError> {
        let program = self.kind.program();
        let executable = which::which(program).map_err(|_| SubprocessError::NotFound {
            program: program.to_string(),
        })?;
        let args = build_args(self.kind, verb, packages, flags);
        let command_line = format!("{program} {}", args.join(" "));

        tracing::info!("Running {command_line}");
        let output = Command::new(executable)
            .args(&args)
            .current_dir(&self.project_dir)
            .output()
            .map_err(|e| SubprocessError::Spawn {
                program: program.to_string(),
                error: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let diagnostics = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(SubprocessError::Failed {
                command: command_line,
                status: output.status.to_string(),
                diagnostics,
            });
        }

        Ok(PmOutput {
            command: command_line,
            stdout,
            stderr,
        })
    }
}
