//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use commands::Commands;

use crate::core::settings::Settings;
use crate::infra::dirs::MeowDirs;
use crate::infra::http;
use crate::infra::integrity::IntegrityResolver;
use crate::infra::package_manager::{CommandAdapter, PackageManagerKind};
use crate::registry::client::RegistryClient;
use output::Output;

/// Meow - dependency lock file manager for npm, yarn and pnpm projects
///
/// Records resolved versions, tarball URLs and integrity digests in
/// `deps.neko` and delegates installation to the project's package manager.
#[derive(Parser, Debug)]
#[command(name = "meow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long = "cwd", global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Registry base URL
    #[arg(long, env = "MEOW_REGISTRY", global = true, value_name = "URL")]
    pub registry: Option<String>,

    /// Package manager to run (npm, yarn or pnpm); detected when unset
    #[arg(long, env = "MEOW_PACKAGE_MANAGER", global = true, value_name = "NAME")]
    pub package_manager: Option<PackageManagerKind>,

    /// Only update deps.neko, never run the package manager
    #[arg(long, global = true)]
    pub no_install: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let Some(command) = self.command else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            return Ok(());
        };

        let project_dir = match self.cwd {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to read current directory")?,
        };
        let settings = Settings::load(&MeowDirs::new())
            .context("Failed to load global settings")?
            .with_overrides(self.registry, self.package_manager);

        let ctx = CommandContext {
            project_dir,
            settings,
            install: !self.no_install,
            output: Output::new(self.quiet),
        };
        command.run(&ctx).await
    }
}

/// Everything a command handler needs from the global flags
#[derive(Debug)]
pub struct CommandContext {
    /// Project directory holding package.json and deps.neko
    pub project_dir: PathBuf,
    /// Settings with flag and environment overrides applied
    pub settings: Settings,
    /// Whether the package manager may be invoked
    pub install: bool,
    /// User-facing output
    pub output: Output,
}

impl CommandContext {
    fn http_client(&self) -> reqwest::Client {
        http::build_client(
            self.settings.timeout_secs(),
            self.settings.connect_timeout_secs(),
        )
    }

    /// Registry client for the configured registry
    pub fn registry(&self) -> RegistryClient {
        RegistryClient::with_client(self.http_client(), self.settings.registry_url())
    }

    /// Integrity resolver sharing the configured timeouts
    pub fn integrity(&self) -> IntegrityResolver {
        IntegrityResolver::with_client(self.http_client())
    }

    /// Package manager adapter, unless `--no-install` was given
    pub fn package_manager(&self) -> Option<CommandAdapter> {
        self.install.then(|| {
            let kind = self.settings.package_manager_for(&self.project_dir);
            tracing::debug!("Using package manager {kind}");
            CommandAdapter::new(kind, &self.project_dir)
        })
    }
}
