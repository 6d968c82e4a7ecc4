//! # Turnstile
//!
//! A fault-total lifecycle router where billing events decide and
//! backend collaborators execute.
//!
//! ## Core Concepts
//!
//! Turnstile sits between a billing/ordering system and a
//! server-management backend. The billing system emits discrete
//! lifecycle signals; turnstile translates each into one concrete
//! action and reports a normalized result back:
//!
//! - [`LifecycleEvent`] = the closed set of signals
//!   (provision, terminate, suspend, unsuspend, usage-update)
//! - [`Outcome`] = the normalized result (success token or a
//!   human-readable failure message)
//!
//! The key principle: **one event, one action, one outcome**. A failure
//! in any lifecycle action must never propagate as a crash - every path
//! degrades to a reported message.
//!
//! ## Architecture
//!
//! ```text
//! Billing system (host dispatch)
//!     │  functions()           name → operation binding
//!     ▼  handle(event, ctx)
//! EventRouter
//!     ├─ provision ─────────► Provisioner
//!     ├─ terminate ─────────► ConfigSource (delete action)
//!     │       ├─ wipe ──────► ServerControl
//!     │       └─ ticket ────► TicketCreator
//!     ├─ suspend/unsuspend ─► ServerControl
//!     └─ usage ─────────────► UsageReporter
//!     │
//!     ▼
//! Outcome ("success" | failure message)      faults → ActivityLog
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Handlers are total** - every fault is caught at the handler
//!    boundary and rendered into the outcome; only construction errors
//!    propagate (a missing collaborator is a deployment error)
//! 2. **Context is explicit** - the billing context is a parameter, not
//!    ambient global state
//! 3. **Policy is live** - the terminate delete action is re-read from
//!    configuration on every call
//! 4. **No cross-event state** - one event per invocation, nothing
//!    retained between events, no retries or queues
//!
//! ## Example
//!
//! ```ignore
//! use turnstile::{BillingContext, EnvConfig, EventRouter, LifecycleEvent};
//!
//! let router = EventRouter::builder()
//!     .provisioner(ScpProvisioner::new(api.clone()))
//!     .server_control(ScpServerControl::new(api))
//!     .config(EnvConfig::new())
//!     .ticket_creator(HelpdeskTickets::new(helpdesk))
//!     .usage_reporter(BandwidthReconciler::new(meter))
//!     .build()?;
//!
//! // Host dispatch layer binds names to operations without a router:
//! let table = EventRouter::functions();
//!
//! let ctx = BillingContext::new(service_id);
//! let outcome = router.handle(LifecycleEvent::Provision, &ctx).await;
//! respond(outcome.as_str());
//! ```
//!
//! ## What This Is Not
//!
//! Turnstile is **not**:
//! - The billing system or its dispatch framework
//! - A provisioning algorithm (that lives behind [`Provisioner`])
//! - A queue, a retry loop, or an event store
//!
//! Turnstile **is**:
//! > A fault-total lifecycle router where billing events decide and
//! > backend collaborators execute.

mod audit;
mod config;
mod context;
mod error;
mod event;
mod provision;
mod router;
mod server;
mod ticket;
mod usage;

// Testing utilities (feature-gated, also used by this crate's own tests)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export event types and the dispatch table
pub use event::{functions, LifecycleEvent, Outcome, UnknownEvent};

// Re-export the explicit context
pub use context::{BillingContext, BillingId};

// Re-export collaborator seams
pub use audit::{ActivityLog, TracingActivityLog};
pub use config::{ConfigSource, DeleteAction, EnvConfig, KEY_DELETE_ACTION, KEY_USER_ID};
pub use provision::Provisioner;
pub use server::{ServerControl, ServerHandle, ServerId};
pub use ticket::{Ticket, TicketCreator, CANCELLATION_SUBJECT};
pub use usage::UsageReporter;

// Re-export error types
pub use error::RouterError;

// Re-export the router (primary entry point)
pub use router::{EventRouter, RouterBuilder};

// Re-export commonly used external types
pub use async_trait::async_trait;
