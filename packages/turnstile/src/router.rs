//! The lifecycle event router.
//!
//! One handler per lifecycle event, each a total function from a
//! [`BillingContext`] to an [`Outcome`]: every internal fault is caught
//! at the handler boundary, logged where the path calls for it, and
//! rendered into the outcome message. Nothing is retried, queued, or
//! escalated - the host framework gets a string and decides what to do.
//!
//! Handlers run one at a time per invocation; the router holds no state
//! between events beyond its wired collaborators.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::audit::{ActivityLog, TracingActivityLog};
use crate::config::{self, ConfigSource, DeleteAction};
use crate::context::BillingContext;
use crate::error::RouterError;
use crate::event::{self, LifecycleEvent, Outcome};
use crate::provision::Provisioner;
use crate::server::ServerControl;
use crate::ticket::{Ticket, TicketCreator};
use crate::usage::UsageReporter;

/// Reported when provisioning finds nothing to allocate.
///
/// The wording is a host-facing contract carried over from the billing
/// side; no ticket is opened on this path.
const NO_INVENTORY: &str = "No resource found in inventory; provisioning ticket created.";

/// Reported when the usage reconciliation run finishes with errors.
const USAGE_FAILED: &str = "Error running usage update";

/// Routes lifecycle events to actions against the backend collaborators.
pub struct EventRouter {
    provisioner: Arc<dyn Provisioner>,
    servers: Arc<dyn ServerControl>,
    config: Arc<dyn ConfigSource>,
    tickets: Arc<dyn TicketCreator>,
    usage: Arc<dyn UsageReporter>,
    audit: Arc<dyn ActivityLog>,
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter").finish_non_exhaustive()
    }
}

impl EventRouter {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Pure name → operation dispatch table for the host framework.
    ///
    /// Requires no collaborators; see [`event::functions`].
    pub fn functions() -> BTreeMap<&'static str, &'static str> {
        event::functions()
    }

    /// Dispatch one event to its bound handler.
    pub async fn handle(&self, event: LifecycleEvent, ctx: &BillingContext) -> Outcome {
        debug!(%event, billing_id = %ctx.billing_id, "handling lifecycle event");
        match event {
            LifecycleEvent::Provision => self.provision(ctx).await,
            LifecycleEvent::Terminate => self.terminate(ctx).await,
            LifecycleEvent::Suspend => self.suspend(ctx).await,
            LifecycleEvent::Unsuspend => self.unsuspend(ctx).await,
            LifecycleEvent::UsageUpdate => self.usage(ctx).await,
        }
    }

    /// Allocate a server for this billing context.
    ///
    /// An empty inventory is an expected outcome and gets its own
    /// message; a provisioning fault is returned verbatim.
    pub async fn provision(&self, ctx: &BillingContext) -> Outcome {
        match self.provisioner.create(ctx).await {
            Ok(Some(server)) => {
                debug!(server_id = %server.id, billing_id = %ctx.billing_id, "server provisioned");
                Outcome::Success
            }
            Ok(None) => Outcome::failure(NO_INVENTORY),
            Err(err) => Outcome::from(err),
        }
    }

    /// Tear down this billing context's server per the configured
    /// delete action.
    ///
    /// The action is re-read from configuration on every call so live
    /// changes take effect; an unrecognized value is a fatal
    /// configuration fault, never a silent no-op.
    pub async fn terminate(&self, ctx: &BillingContext) -> Outcome {
        match self.run_delete_action(ctx).await {
            Ok(()) => Outcome::Success,
            Err(err) => self.fail("terminate", err),
        }
    }

    async fn run_delete_action(&self, ctx: &BillingContext) -> Result<()> {
        let raw = self.config.option(config::KEY_DELETE_ACTION)?;
        match raw.parse::<DeleteAction>()? {
            DeleteAction::Wipe => {
                let server = self.servers.current(ctx).await?;
                self.servers.wipe(&server).await?;
            }
            DeleteAction::Ticket => {
                let client_id = self.config.get(config::KEY_USER_ID)?;
                let ticket = Ticket::cancellation(client_id, ctx.billing_id);
                self.tickets.create(ticket).await?;
            }
        }
        Ok(())
    }

    /// Suspend this billing context's server.
    pub async fn suspend(&self, ctx: &BillingContext) -> Outcome {
        match self.suspend_current(ctx).await {
            Ok(()) => Outcome::Success,
            Err(err) => self.fail("suspend", err),
        }
    }

    async fn suspend_current(&self, ctx: &BillingContext) -> Result<()> {
        let server = self.servers.current(ctx).await?;
        self.servers.suspend(&server).await
    }

    /// Lift a suspension on this billing context's server.
    pub async fn unsuspend(&self, ctx: &BillingContext) -> Outcome {
        match self.unsuspend_current(ctx).await {
            Ok(()) => Outcome::Success,
            Err(err) => self.fail("unsuspend", err),
        }
    }

    async fn unsuspend_current(&self, ctx: &BillingContext) -> Result<()> {
        let server = self.servers.current(ctx).await?;
        self.servers.unsuspend(&server).await
    }

    /// Reconcile usage for this billing context.
    pub async fn usage(&self, ctx: &BillingContext) -> Outcome {
        if self.usage.run_and_log_errors(ctx.billing_id).await {
            Outcome::Success
        } else {
            Outcome::failure(USAGE_FAILED)
        }
    }

    /// Log a handler fault once and render it into the outcome.
    fn fail(&self, action: &'static str, err: anyhow::Error) -> Outcome {
        warn!(action, error = %err, "lifecycle action failed");
        self.audit.activity(&format!("error during {action}: {err}"));
        Outcome::from(err)
    }
}

/// Wires collaborators into an [`EventRouter`] at the composition root.
///
/// Every seam except the activity log is required; a missing one is a
/// deployment error and [`RouterBuilder::build`] reports it instead of
/// handing back a half-wired router. The activity log defaults to
/// [`TracingActivityLog`].
#[derive(Default)]
pub struct RouterBuilder {
    provisioner: Option<Arc<dyn Provisioner>>,
    servers: Option<Arc<dyn ServerControl>>,
    config: Option<Arc<dyn ConfigSource>>,
    tickets: Option<Arc<dyn TicketCreator>>,
    usage: Option<Arc<dyn UsageReporter>>,
    audit: Option<Arc<dyn ActivityLog>>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provisioner(mut self, provisioner: impl Provisioner + 'static) -> Self {
        self.provisioner = Some(Arc::new(provisioner));
        self
    }

    pub fn server_control(mut self, servers: impl ServerControl + 'static) -> Self {
        self.servers = Some(Arc::new(servers));
        self
    }

    pub fn config(mut self, config: impl ConfigSource + 'static) -> Self {
        self.config = Some(Arc::new(config));
        self
    }

    pub fn ticket_creator(mut self, tickets: impl TicketCreator + 'static) -> Self {
        self.tickets = Some(Arc::new(tickets));
        self
    }

    pub fn usage_reporter(mut self, usage: impl UsageReporter + 'static) -> Self {
        self.usage = Some(Arc::new(usage));
        self
    }

    pub fn activity_log(mut self, audit: impl ActivityLog + 'static) -> Self {
        self.audit = Some(Arc::new(audit));
        self
    }

    pub fn build(self) -> Result<EventRouter, RouterError> {
        Ok(EventRouter {
            provisioner: self
                .provisioner
                .ok_or(RouterError::MissingCollaborator("provisioner"))?,
            servers: self
                .servers
                .ok_or(RouterError::MissingCollaborator("server control"))?,
            config: self
                .config
                .ok_or(RouterError::MissingCollaborator("config source"))?,
            tickets: self
                .tickets
                .ok_or(RouterError::MissingCollaborator("ticket creator"))?,
            usage: self
                .usage
                .ok_or(RouterError::MissingCollaborator("usage reporter"))?,
            audit: self.audit.unwrap_or_else(|| Arc::new(TracingActivityLog)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KEY_DELETE_ACTION, KEY_USER_ID};
    use crate::server::ServerHandle;
    use crate::testing::{
        FakeProvisioner, FakeServerControl, FakeTicketDesk, FakeUsageReporter, MemoryConfig,
        RecordingActivityLog, ServerOp,
    };

    struct Harness {
        servers: FakeServerControl,
        tickets: FakeTicketDesk,
        config: MemoryConfig,
        audit: RecordingActivityLog,
        usage: FakeUsageReporter,
        router: EventRouter,
    }

    fn harness(provisioner: FakeProvisioner, servers: FakeServerControl) -> Harness {
        let tickets = FakeTicketDesk::new();
        let config = MemoryConfig::new()
            .with_option(KEY_DELETE_ACTION, "wipe")
            .with_setting(KEY_USER_ID, "17");
        let audit = RecordingActivityLog::default();
        let usage = FakeUsageReporter::clean();
        let router = EventRouter::builder()
            .provisioner(provisioner)
            .server_control(servers.clone())
            .config(config.clone())
            .ticket_creator(tickets.clone())
            .usage_reporter(usage.clone())
            .activity_log(audit.clone())
            .build()
            .unwrap();
        Harness {
            servers,
            tickets,
            config,
            audit,
            usage,
            router,
        }
    }

    fn ctx() -> BillingContext {
        BillingContext::new(42)
    }

    fn bound_server() -> ServerHandle {
        ServerHandle::new(9, 42)
    }

    #[tokio::test]
    async fn test_provision_succeeds_when_inventory_has_a_server() {
        let h = harness(
            FakeProvisioner::with_inventory(bound_server()),
            FakeServerControl::bound(bound_server()),
        );
        assert_eq!(h.router.provision(&ctx()).await, Outcome::Success);
    }

    #[tokio::test]
    async fn test_provision_reports_empty_inventory_without_a_ticket() {
        let h = harness(
            FakeProvisioner::empty(),
            FakeServerControl::bound(bound_server()),
        );
        let outcome = h.router.provision(&ctx()).await;
        assert_eq!(
            outcome.as_str(),
            "No resource found in inventory; provisioning ticket created."
        );
        // Despite the wording, the provision path never opens a ticket.
        assert!(h.tickets.created().is_empty());
    }

    #[tokio::test]
    async fn test_provision_fault_message_is_returned_verbatim() {
        let h = harness(
            FakeProvisioner::failing("provisioning API unreachable"),
            FakeServerControl::bound(bound_server()),
        );
        let outcome = h.router.provision(&ctx()).await;
        assert_eq!(outcome, Outcome::failure("provisioning API unreachable"));
    }

    #[tokio::test]
    async fn test_terminate_wipe_wipes_the_bound_server() {
        let h = harness(
            FakeProvisioner::empty(),
            FakeServerControl::bound(bound_server()),
        );
        assert_eq!(h.router.terminate(&ctx()).await, Outcome::Success);
        assert_eq!(h.servers.ops(), vec![ServerOp::Wipe]);
        assert!(h.audit.entries().is_empty());
    }

    #[tokio::test]
    async fn test_terminate_ticket_opens_exactly_one_cancellation_ticket() {
        let h = harness(
            FakeProvisioner::empty(),
            FakeServerControl::bound(bound_server()),
        );
        h.config.set_option(KEY_DELETE_ACTION, "ticket");
        assert_eq!(h.router.terminate(&ctx()).await, Outcome::Success);

        let created = h.tickets.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].client_id, "17");
        assert_eq!(created[0].subject, "Server Cancellation");
        assert_eq!(
            created[0].message,
            "Server with billing ID 42 has been terminated."
        );
        // Ticket mode never touches the server itself.
        assert!(h.servers.ops().is_empty());
    }

    #[tokio::test]
    async fn test_terminate_rejects_unrecognized_delete_action() {
        let h = harness(
            FakeProvisioner::empty(),
            FakeServerControl::bound(bound_server()),
        );
        h.config.set_option(KEY_DELETE_ACTION, "bogus");
        let outcome = h.router.terminate(&ctx()).await;
        assert_eq!(outcome.as_str(), "Unhandled delete action: bogus");
        assert!(h.servers.ops().is_empty());
        assert!(h.tickets.created().is_empty());
        assert_eq!(h.audit.entries().len(), 1);
        assert!(h.audit.entries()[0].contains("error during terminate"));
    }

    #[tokio::test]
    async fn test_terminate_rereads_delete_action_each_call() {
        let h = harness(
            FakeProvisioner::empty(),
            FakeServerControl::bound(bound_server()),
        );
        assert_eq!(h.router.terminate(&ctx()).await, Outcome::Success);
        assert_eq!(h.servers.ops(), vec![ServerOp::Wipe]);

        h.config.set_option(KEY_DELETE_ACTION, "ticket");
        assert_eq!(h.router.terminate(&ctx()).await, Outcome::Success);
        assert_eq!(h.tickets.created().len(), 1);
        // No second wipe after the live configuration change.
        assert_eq!(h.servers.ops(), vec![ServerOp::Wipe]);
    }

    #[tokio::test]
    async fn test_terminate_fault_is_logged_and_reported() {
        let h = harness(FakeProvisioner::empty(), FakeServerControl::unbound());
        let outcome = h.router.terminate(&ctx()).await;
        assert_eq!(outcome.as_str(), "No server found for billing ID 42");
        assert_eq!(h.audit.entries().len(), 1);
        assert_eq!(
            h.audit.entries()[0],
            "error during terminate: No server found for billing ID 42"
        );
    }

    #[tokio::test]
    async fn test_suspend_suspends_the_bound_server_once() {
        let h = harness(
            FakeProvisioner::empty(),
            FakeServerControl::bound(bound_server()),
        );
        assert_eq!(h.router.suspend(&ctx()).await, Outcome::Success);
        assert_eq!(h.servers.ops(), vec![ServerOp::Suspend]);
        assert!(h.audit.entries().is_empty());
    }

    #[tokio::test]
    async fn test_unsuspend_unsuspends_the_bound_server_once() {
        let h = harness(
            FakeProvisioner::empty(),
            FakeServerControl::bound(bound_server()),
        );
        assert_eq!(h.router.unsuspend(&ctx()).await, Outcome::Success);
        assert_eq!(h.servers.ops(), vec![ServerOp::Unsuspend]);
    }

    #[tokio::test]
    async fn test_suspend_resolution_fault_is_logged_once_and_unchanged() {
        let h = harness(FakeProvisioner::empty(), FakeServerControl::unbound());
        let outcome = h.router.suspend(&ctx()).await;
        assert_eq!(outcome.as_str(), "No server found for billing ID 42");
        assert_eq!(h.audit.entries().len(), 1);
        assert_eq!(
            h.audit.entries()[0],
            "error during suspend: No server found for billing ID 42"
        );
    }

    #[tokio::test]
    async fn test_suspend_operation_fault_is_reported() {
        let h = harness(
            FakeProvisioner::empty(),
            FakeServerControl::bound(bound_server()).with_op_fault("backend rejected suspend"),
        );
        let outcome = h.router.suspend(&ctx()).await;
        assert_eq!(outcome, Outcome::failure("backend rejected suspend"));
        assert_eq!(h.audit.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_usage_succeeds_when_reporter_is_clean() {
        let h = harness(
            FakeProvisioner::empty(),
            FakeServerControl::bound(bound_server()),
        );
        assert_eq!(h.router.usage(&ctx()).await, Outcome::Success);
        assert_eq!(h.usage.runs(), vec![ctx().billing_id]);
    }

    #[tokio::test]
    async fn test_usage_reports_fixed_message_on_reporter_errors() {
        let servers = FakeServerControl::bound(bound_server());
        let usage = FakeUsageReporter::erroring();
        let router = EventRouter::builder()
            .provisioner(FakeProvisioner::empty())
            .server_control(servers)
            .config(MemoryConfig::new())
            .ticket_creator(FakeTicketDesk::new())
            .usage_reporter(usage.clone())
            .build()
            .unwrap();
        let outcome = router.usage(&ctx()).await;
        assert_eq!(outcome, Outcome::failure("Error running usage update"));
        assert_eq!(usage.runs(), vec![ctx().billing_id]);
    }

    #[tokio::test]
    async fn test_handle_dispatches_each_event_to_its_handler() {
        let h = harness(
            FakeProvisioner::with_inventory(bound_server()),
            FakeServerControl::bound(bound_server()),
        );
        let ctx = ctx();
        for event in LifecycleEvent::ALL {
            assert_eq!(
                h.router.handle(event, &ctx).await,
                Outcome::Success,
                "event {event} should succeed against a healthy backend"
            );
        }
        assert_eq!(
            h.servers.ops(),
            vec![ServerOp::Wipe, ServerOp::Suspend, ServerOp::Unsuspend]
        );
    }

    #[tokio::test]
    async fn test_builder_reports_missing_collaborator() {
        let err = EventRouter::builder()
            .provisioner(FakeProvisioner::empty())
            .build()
            .unwrap_err();
        assert_eq!(err, RouterError::MissingCollaborator("server control"));
    }

    #[test]
    fn test_builder_defaults_the_activity_log() {
        let router = EventRouter::builder()
            .provisioner(FakeProvisioner::empty())
            .server_control(FakeServerControl::unbound())
            .config(MemoryConfig::new())
            .ticket_creator(FakeTicketDesk::new())
            .usage_reporter(FakeUsageReporter::clean())
            .build();
        assert!(router.is_ok());
    }

    #[test]
    fn test_functions_table_is_exposed_on_the_router() {
        assert_eq!(EventRouter::functions(), crate::event::functions());
    }
}
