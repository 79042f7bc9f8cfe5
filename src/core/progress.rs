//! Progress reporting capability
//!
//! Reconciliation reports what it is doing through a [`Progress`] handed in
//! by the caller. The CLI passes a spinner-backed implementation; tests and
//! library users can pass [`NoProgress`].

use crate::core::reconcile::Phase;

/// Receives progress notifications from a reconciliation
pub trait Progress: Send + Sync {
    /// `package` entered `phase`
    fn phase(&self, package: &str, phase: Phase);

    /// Free-form status line
    fn message(&self, text: &str);

    /// Recoverable problem worth showing to the user
    fn warn(&self, text: &str);
}

/// Discards all progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn phase(&self, _package: &str, _phase: Phase) {}

    fn message(&self, _text: &str) {}

    fn warn(&self, _text: &str) {}
}
