//! Explicit billing context threaded into every handler.
//!
//! The resource bound to an account is always resolved *from* this
//! context, never from ambient global state, which keeps every handler
//! independently testable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The billing system's reference to the account/order driving an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillingId(i64);

impl BillingId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> i64 {
        self.0
    }
}

impl From<i64> for BillingId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for BillingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ambient context for one lifecycle event.
///
/// Created fresh per event and discarded once the outcome is produced;
/// no cross-event state lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingContext {
    /// The account/order this event is about.
    pub billing_id: BillingId,
}

impl BillingContext {
    pub fn new(billing_id: impl Into<BillingId>) -> Self {
        Self {
            billing_id: billing_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_id_display() {
        assert_eq!(BillingId::new(42).to_string(), "42");
    }

    #[test]
    fn test_context_from_raw_id() {
        let ctx = BillingContext::new(7);
        assert_eq!(ctx.billing_id, BillingId::new(7));
    }
}
