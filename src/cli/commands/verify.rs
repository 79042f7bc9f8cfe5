//! Verify command implementation
//!
//! Implements `meow verify`: every entry in deps.neko is downloaded again
//! from its `resolved` URL and hashed with the algorithm its stored digest
//! names. Any mismatch or download failure makes the command fail.

use anyhow::{bail, Result};
use futures::future::join_all;

use crate::cli::CommandContext;
use crate::core::lock::LockDocument;

/// Execute the verify command
pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let path = LockDocument::path_in(&ctx.project_dir);
    let loaded = LockDocument::load(&path);
    if !loaded.existed {
        bail!(
            "No deps.neko found in {}. Run 'meow init' or 'meow add' first.",
            ctx.project_dir.display()
        );
    }
    if let Some(warning) = loaded.warning {
        return Err(warning.into());
    }

    let document = loaded.document;
    if document.is_empty() {
        ctx.output.info("deps.neko has no entries to verify");
        return Ok(());
    }

    let integrity = ctx.integrity();
    let progress = ctx.output.progress(&format!("Verifying {} packages...", document.len()));
    let checks = document.entries().map(|(kind, name, entry)| {
        let integrity = &integrity;
        async move {
            let result = integrity.verify(&entry.resolved_url, &entry.integrity).await;
            (kind, name, entry, result)
        }
    });
    let results = join_all(checks).await;
    progress.finish();

    let mut problems = 0usize;
    for (kind, name, entry, result) in results {
        match result {
            Ok(true) => ctx.output.success(&format!("{name}@{} ({kind})", entry.version)),
            Ok(false) => {
                problems += 1;
                ctx.output.failure(&format!(
                    "{name}@{}: integrity mismatch for {}",
                    entry.version, entry.resolved_url
                ));
            }
            Err(error) => {
                problems += 1;
                ctx.output.failure(&format!("{name}@{}: {error}", entry.version));
            }
        }
    }

    if problems > 0 {
        bail!(
            "{problems} of {} locked packages failed verification",
            document.len()
        );
    }
    ctx.output.success(&format!("All {} locked packages verified", document.len()));
    Ok(())
}
