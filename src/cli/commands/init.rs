//! CLI implementation for `meow init`
//!
//! Writes an empty `deps.neko` (header only) if the project has none.

use anyhow::{Context, Result};

use crate::cli::CommandContext;
use crate::core::lock::LockDocument;

/// Execute the init command
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let path = LockDocument::path_in(&ctx.project_dir);
    if path.exists() {
        ctx.output.info(&format!("{} already exists", path.display()));
        return Ok(());
    }

    LockDocument::new()
        .save(&path)
        .with_context(|| format!("Failed to initialize {}", path.display()))?;
    ctx.output.success(&format!("Created {}", path.display()));
    Ok(())
}
