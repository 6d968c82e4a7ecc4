//! Human-actionable tickets.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::BillingId;

/// Subject line for terminate-by-ticket cancellations.
pub const CANCELLATION_SUBJECT: &str = "Server Cancellation";

/// One ticket as the ticketing backend accepts it.
///
/// Field names follow the backend's wire format (`clientid`, `subject`,
/// `message`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(rename = "clientid")]
    pub client_id: String,
    pub subject: String,
    pub message: String,
}

impl Ticket {
    /// The cancellation ticket opened when the delete action is `ticket`.
    pub fn cancellation(client_id: impl Into<String>, billing_id: BillingId) -> Self {
        Self {
            client_id: client_id.into(),
            subject: CANCELLATION_SUBJECT.to_string(),
            message: format!("Server with billing ID {billing_id} has been terminated."),
        }
    }
}

/// Opens tickets in the ticketing backend.
#[async_trait]
pub trait TicketCreator: Send + Sync {
    async fn create(&self, ticket: Ticket) -> Result<()>;
}
