//! CLI implementation for `meow install-all`

use anyhow::{Context, Result};

use crate::cli::CommandContext;
use crate::core::reconcile::Reconciler;
use crate::infra::package_manager::PackageManagerAdapter;

/// Execute the install-all command
pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let registry = ctx.registry();
    let integrity = ctx.integrity();
    let adapter = ctx.package_manager();
    let progress = ctx.output.progress("Reading deps.neko...");

    let result = Reconciler::new(
        &ctx.project_dir,
        &registry,
        &integrity,
        adapter.as_ref().map(|a| a as &dyn PackageManagerAdapter),
        &progress,
    )
    .install_all()
    .await;
    progress.finish();

    let report = result.context("Failed to install dependencies")?;
    if report.outcomes.is_empty() {
        ctx.output.info("No dependencies found to install");
        return Ok(());
    }
    ctx.output.report(&report, "Installed");
    Ok(())
}
