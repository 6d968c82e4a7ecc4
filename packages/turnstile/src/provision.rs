//! Provisioning seam.

use anyhow::Result;
use async_trait::async_trait;

use crate::context::BillingContext;
use crate::server::ServerHandle;

/// Allocates a server resource for a billing context.
///
/// The three possible results are explicit, not exception-driven:
/// - `Ok(Some(server))` - a server was allocated and bound
/// - `Ok(None)` - nothing suitable in inventory (an expected business
///   outcome, not a fault)
/// - `Err(_)` - the provisioning run itself failed
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn create(&self, ctx: &BillingContext) -> Result<Option<ServerHandle>>;
}
