//! CLI implementation for `meow remove`

use anyhow::{Context, Result};

use crate::cli::CommandContext;
use crate::core::reconcile::{ReconcileOptions, Reconciler};
use crate::infra::package_manager::PackageManagerAdapter;

/// Execute the remove command
pub async fn execute(
    ctx: &CommandContext,
    packages: &[String],
    dev: bool,
    global: bool,
) -> Result<()> {
    let registry = ctx.registry();
    let integrity = ctx.integrity();
    let adapter = ctx.package_manager();
    let progress = ctx.output.progress("Removing packages...");

    let result = Reconciler::new(
        &ctx.project_dir,
        &registry,
        &integrity,
        adapter.as_ref().map(|a| a as &dyn PackageManagerAdapter),
        &progress,
    )
    .remove(packages, ReconcileOptions { dev, global })
    .await;
    progress.finish();

    let report = result.context("Failed to remove packages")?;
    ctx.output.report(&report, "Removed");
    Ok(())
}
