//! Server-management backend seam.
//!
//! [`ServerControl`] resolves the resource bound to a billing context
//! and performs state changes on it. Exactly one server binds to a
//! billing context at lookup time; absence is a fault, not an empty
//! success.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::{BillingContext, BillingId};

/// Backend identifier for a provisioned server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(i64);

impl ServerId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> i64 {
        self.0
    }
}

impl From<i64> for ServerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The resolved association between a billing context and the server it
/// controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerHandle {
    pub id: ServerId,
    pub billing_id: BillingId,
}

impl ServerHandle {
    pub fn new(id: impl Into<ServerId>, billing_id: impl Into<BillingId>) -> Self {
        Self {
            id: id.into(),
            billing_id: billing_id.into(),
        }
    }
}

/// Control operations against the server-management backend.
///
/// Any concurrency safety for the underlying resource (two terminates
/// racing, say) is this collaborator's responsibility, not the router's.
#[async_trait]
pub trait ServerControl: Send + Sync {
    /// Resolve the server bound to this billing context.
    ///
    /// Faults if no server is bound.
    async fn current(&self, ctx: &BillingContext) -> Result<ServerHandle>;

    /// Destroy the server's data and return it to inventory.
    async fn wipe(&self, server: &ServerHandle) -> Result<()>;

    /// Suspend the server.
    async fn suspend(&self, server: &ServerHandle) -> Result<()>;

    /// Lift a suspension.
    async fn unsuspend(&self, server: &ServerHandle) -> Result<()>;
}
