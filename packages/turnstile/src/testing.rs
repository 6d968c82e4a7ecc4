//! Recording fakes for every collaborator seam.
//!
//! Each fake is cheap to clone and shares its call log across clones,
//! so a test can hand one copy to the router and keep another for
//! assertions:
//!
//! ```ignore
//! let tickets = FakeTicketDesk::new();
//! let router = EventRouter::builder()
//!     .ticket_creator(tickets.clone())
//!     /* ... */
//!     .build()?;
//!
//! router.terminate(&ctx).await;
//! assert_eq!(tickets.created().len(), 1);
//! ```
//!
//! Available to downstream crates with the `testing` feature:
//!
//! ```toml
//! [dev-dependencies]
//! turnstile = { version = "0.1", features = ["testing"] }
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::audit::ActivityLog;
use crate::config::ConfigSource;
use crate::context::{BillingContext, BillingId};
use crate::provision::Provisioner;
use crate::server::{ServerControl, ServerHandle};
use crate::ticket::{Ticket, TicketCreator};
use crate::usage::UsageReporter;

#[derive(Debug, Clone)]
enum ProvisionResponse {
    Server(ServerHandle),
    Empty,
    Fault(String),
}

/// Provisioner fake with a fixed response.
#[derive(Clone)]
pub struct FakeProvisioner {
    response: ProvisionResponse,
    calls: Arc<Mutex<usize>>,
}

impl FakeProvisioner {
    /// Always allocates the given server.
    pub fn with_inventory(server: ServerHandle) -> Self {
        Self::respond(ProvisionResponse::Server(server))
    }

    /// Inventory has nothing suitable.
    pub fn empty() -> Self {
        Self::respond(ProvisionResponse::Empty)
    }

    /// The provisioning run itself fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::respond(ProvisionResponse::Fault(message.into()))
    }

    fn respond(response: ProvisionResponse) -> Self {
        Self {
            response,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// How many times `create` was invoked.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Provisioner for FakeProvisioner {
    async fn create(&self, _ctx: &BillingContext) -> Result<Option<ServerHandle>> {
        *self.calls.lock().unwrap() += 1;
        match &self.response {
            ProvisionResponse::Server(server) => Ok(Some(*server)),
            ProvisionResponse::Empty => Ok(None),
            ProvisionResponse::Fault(message) => Err(anyhow!("{message}")),
        }
    }
}

/// A state-changing operation performed through [`FakeServerControl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerOp {
    Wipe,
    Suspend,
    Unsuspend,
}

/// Server-control fake with an optional binding and a shared op log.
///
/// Only operations that succeed are recorded.
#[derive(Clone)]
pub struct FakeServerControl {
    binding: Option<ServerHandle>,
    op_fault: Option<String>,
    ops: Arc<Mutex<Vec<ServerOp>>>,
}

impl FakeServerControl {
    /// Exactly one server binds to any billing context.
    pub fn bound(server: ServerHandle) -> Self {
        Self {
            binding: Some(server),
            op_fault: None,
            ops: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// No server binds; `current` faults.
    pub fn unbound() -> Self {
        Self {
            binding: None,
            op_fault: None,
            ops: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every state-changing operation fail with this message.
    pub fn with_op_fault(mut self, message: impl Into<String>) -> Self {
        self.op_fault = Some(message.into());
        self
    }

    /// Operations performed so far, in order.
    pub fn ops(&self) -> Vec<ServerOp> {
        self.ops.lock().unwrap().clone()
    }

    fn perform(&self, op: ServerOp) -> Result<()> {
        if let Some(message) = &self.op_fault {
            bail!("{message}");
        }
        self.ops.lock().unwrap().push(op);
        Ok(())
    }
}

#[async_trait]
impl ServerControl for FakeServerControl {
    async fn current(&self, ctx: &BillingContext) -> Result<ServerHandle> {
        self.binding
            .ok_or_else(|| anyhow!("No server found for billing ID {}", ctx.billing_id))
    }

    async fn wipe(&self, _server: &ServerHandle) -> Result<()> {
        self.perform(ServerOp::Wipe)
    }

    async fn suspend(&self, _server: &ServerHandle) -> Result<()> {
        self.perform(ServerOp::Suspend)
    }

    async fn unsuspend(&self, _server: &ServerHandle) -> Result<()> {
        self.perform(ServerOp::Unsuspend)
    }
}

/// Ticket desk fake recording every ticket it accepts.
#[derive(Clone, Default)]
pub struct FakeTicketDesk {
    created: Arc<Mutex<Vec<Ticket>>>,
    fault: Option<String>,
}

impl FakeTicketDesk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `create` call fail with this message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            created: Arc::new(Mutex::new(Vec::new())),
            fault: Some(message.into()),
        }
    }

    /// Tickets accepted so far, in order.
    pub fn created(&self) -> Vec<Ticket> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketCreator for FakeTicketDesk {
    async fn create(&self, ticket: Ticket) -> Result<()> {
        if let Some(message) = &self.fault {
            bail!("{message}");
        }
        self.created.lock().unwrap().push(ticket);
        Ok(())
    }
}

/// Usage reporter fake with a fixed verdict and a run log.
#[derive(Clone)]
pub struct FakeUsageReporter {
    clean: bool,
    runs: Arc<Mutex<Vec<BillingId>>>,
}

impl FakeUsageReporter {
    /// Every run finishes with no errors.
    pub fn clean() -> Self {
        Self {
            clean: true,
            runs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every run reports errors.
    pub fn erroring() -> Self {
        Self {
            clean: false,
            runs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Billing ids reconciled so far, in order.
    pub fn runs(&self) -> Vec<BillingId> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl UsageReporter for FakeUsageReporter {
    async fn run_and_log_errors(&self, billing_id: BillingId) -> bool {
        self.runs.lock().unwrap().push(billing_id);
        self.clean
    }
}

/// In-memory configuration with live mutation.
///
/// Options and settings are separate maps, mirroring the split between
/// module options and global settings in the real store. `set_option`
/// works through shared state so a test can reconfigure a router that
/// is already built.
#[derive(Clone, Default)]
pub struct MemoryConfig {
    options: Arc<Mutex<BTreeMap<String, String>>>,
    settings: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.lock().unwrap().insert(key.into(), value.into());
        self
    }

    pub fn with_setting(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.lock().unwrap().insert(key.into(), value.into());
        self
    }

    /// Change an option after the router is built.
    pub fn set_option(&self, key: impl Into<String>, value: impl Into<String>) {
        self.options.lock().unwrap().insert(key.into(), value.into());
    }
}

impl ConfigSource for MemoryConfig {
    fn option(&self, key: &str) -> Result<String> {
        self.options
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("configuration option {key} is not set"))
    }

    fn get(&self, key: &str) -> Result<String> {
        self.settings
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("configuration setting {key} is not set"))
    }
}

/// Activity log fake capturing entries in order.
#[derive(Clone, Default)]
pub struct RecordingActivityLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl RecordingActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

impl ActivityLog for RecordingActivityLog {
    fn activity(&self, message: &str) {
        self.entries.lock().unwrap().push(message.to_string());
    }
}
