//! Output formatting and progress indicators
//!
//! This module provides utilities for displaying spinners and formatted
//! messages to the user. Everything except command results goes to stderr.

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::progress::Progress;
use crate::core::reconcile::{InstallStatus, PackageChange, Phase, ReconcileReport};

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// User-facing output honouring `--quiet`
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(self, message: &str) {
        if !self.quiet {
            println!("{} {message}", status::SUCCESS);
        }
    }

    pub fn info(self, message: &str) {
        if !self.quiet {
            println!("{} {message}", status::INFO);
        }
    }

    /// Indented detail line under a status line
    pub fn detail(self, message: &str) {
        if !self.quiet {
            println!("  {message}");
        }
    }

    /// Warnings are shown even with `--quiet`
    pub fn warning(self, message: &str) {
        eprintln!("{} {message}", status::WARNING);
    }

    pub fn failure(self, message: &str) {
        eprintln!("{} {message}", status::ERROR);
    }

    /// Spinner for a reconciliation, hidden when quiet
    pub fn progress(self, message: &str) -> SpinnerProgress {
        let bar = if self.quiet {
            ProgressBar::hidden()
        } else {
            create_spinner(message)
        };
        SpinnerProgress { bar }
    }

    /// Print the succeeded/failed summary of a reconciliation
    pub fn report(self, report: &ReconcileReport, verb: &str) {
        for outcome in &report.outcomes {
            match &outcome.result {
                Ok(PackageChange::Locked { kind, entry }) => self.success(&format!(
                    "{verb} {}@{} ({kind})",
                    outcome.name, entry.version
                )),
                Ok(PackageChange::Removed { kind, entry: Some(entry) }) => self.success(&format!(
                    "{verb} {}@{} ({kind})",
                    outcome.name, entry.version
                )),
                Ok(PackageChange::Removed { kind, entry: None }) => {
                    self.info(&format!("{} was not locked in {kind}", outcome.name));
                }
                // Reported as they happen through `Progress::warn`
                Err(_) => {}
            }
        }

        if report.lock_written {
            self.detail("Updated deps.neko");
        }

        match &report.install {
            InstallStatus::Skipped => self.detail("Package manager skipped (--no-install)"),
            InstallStatus::NothingToDo => {}
            InstallStatus::Ran(results) => {
                for result in results {
                    match result {
                        Ok(command) => self.detail(&format!("Ran {command}")),
                        Err(error) => self.warning(&format!(
                            "{error}\n  deps.neko keeps the recorded changes"
                        )),
                    }
                }
            }
        }

        let succeeded = report.succeeded();
        let failed = report.failed();
        if !failed.is_empty() {
            let names: Vec<&str> = failed.iter().map(|(name, _)| *name).collect();
            self.warning(&format!(
                "{} succeeded, {} failed: {}",
                succeeded.len(),
                failed.len(),
                names.join(", ")
            ));
        }
    }
}

/// [`Progress`] backed by an indicatif spinner
#[derive(Debug)]
pub struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    /// Remove the spinner from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Progress for SpinnerProgress {
    fn phase(&self, package: &str, phase: Phase) {
        match phase {
            Phase::Resolving | Phase::Verifying | Phase::Persisting => {
                self.bar.set_message(format!("{package}: {phase}"));
            }
            Phase::Idle | Phase::Done | Phase::Failed => {}
        }
    }

    fn message(&self, text: &str) {
        self.bar.set_message(text.to_string());
    }

    fn warn(&self, text: &str) {
        self.bar.suspend(|| eprintln!("{} {text}", status::WARNING));
    }
}

/// Display an error with its cause chain
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  Caused by: {cause}");
    }
}
