//! Usage reconciliation seam.

use async_trait::async_trait;

use crate::context::BillingId;

/// Reconciles resource usage against a billing identifier.
///
/// The reporter logs its own errors; the boolean is the whole contract.
/// `true` means the run finished with no errors.
#[async_trait]
pub trait UsageReporter: Send + Sync {
    async fn run_and_log_errors(&self, billing_id: BillingId) -> bool;
}
