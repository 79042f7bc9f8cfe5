//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod add;
pub mod init;
pub mod install;
pub mod remove;
pub mod verify;

use anyhow::Result;
use clap::Subcommand;

use super::CommandContext;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty deps.neko in the project
    Init,

    /// Resolve packages, record them in deps.neko and install them
    Add {
        /// Packages as name, name@version, name@tag or name@range
        #[arg(required = true)]
        packages: Vec<String>,

        /// Record under devDependencies
        #[arg(short = 'D', long)]
        dev: bool,

        /// Install globally
        #[arg(short, long)]
        global: bool,
    },

    /// Remove packages from deps.neko and uninstall them
    Remove {
        /// Package names
        #[arg(required = true)]
        packages: Vec<String>,

        /// Remove from devDependencies
        #[arg(short = 'D', long)]
        dev: bool,

        /// Uninstall globally
        #[arg(short, long)]
        global: bool,
    },

    /// Install everything recorded in deps.neko (or declared in package.json)
    #[command(name = "install-all", visible_alias = "install")]
    InstallAll,

    /// Re-download locked tarballs and check their integrity digests
    Verify,
}

impl Commands {
    /// Execute the command
    pub async fn run(self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Init => init::execute(ctx),
            Self::Add {
                packages,
                dev,
                global,
            } => add::execute(ctx, &packages, dev, global).await,
            Self::Remove {
                packages,
                dev,
                global,
            } => remove::execute(ctx, &packages, dev, global).await,
            Self::InstallAll => install::execute(ctx).await,
            Self::Verify => verify::execute(ctx).await,
        }
    }
}
