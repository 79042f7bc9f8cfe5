//! CLI implementation for `meow add`

use anyhow::{Context, Result};

use crate::cli::CommandContext;
use crate::core::reconcile::{ReconcileOptions, Reconciler};
use crate::infra::package_manager::PackageManagerAdapter;

/// Execute the add command
pub async fn execute(
    ctx: &CommandContext,
    packages: &[String],
    dev: bool,
    global: bool,
) -> Result<()> {
    let registry = ctx.registry();
    let integrity = ctx.integrity();
    let adapter = ctx.package_manager();
    let progress = ctx.output.progress("Resolving packages...");

    let reconciler = Reconciler::new(
        &ctx.project_dir,
        &registry,
        &integrity,
        adapter.as_ref().map(|a| a as &dyn PackageManagerAdapter),
        &progress,
    );
    let result = reconciler.add(packages, ReconcileOptions { dev, global }).await;
    progress.finish();

    let report = result.context("Failed to add packages")?;
    ctx.output.report(&report, "Added");
    Ok(())
}
