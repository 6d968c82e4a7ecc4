//! Best-effort activity trail for exceptional conditions.
//!
//! The activity log is an observer: it must never affect the main path,
//! so the trait is infallible by construction. Backends that can fail
//! swallow their own errors.

use tracing::warn;

/// Records exceptional conditions for later audit.
pub trait ActivityLog: Send + Sync {
    /// Record one preformatted activity entry. Never faults.
    fn activity(&self, message: &str);
}

/// Default activity log: entries land on the `tracing` subscriber at
/// `warn` level under the `turnstile::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingActivityLog;

impl ActivityLog for TracingActivityLog {
    fn activity(&self, message: &str) {
        warn!(target: "turnstile::audit", "{message}");
    }
}
