//! Lifecycle events and normalized outcomes.
//!
//! Turnstile separates **signals** from **results**:
//! - [`LifecycleEvent`] = the closed set of signals the billing system emits
//! - [`Outcome`] = the normalized result reported back for each signal
//!
//! Every event name maps to exactly one handler operation. Dispatch-table
//! ownership belongs to the host framework: [`functions`] hands it the
//! name → operation binding without requiring any collaborator to exist.
//!
//! # Wire names
//!
//! The billing system emits its own internal event names
//! (`CreateAccount`, `TerminateAccount`, ...). Those are carried as
//! [`LifecycleEvent::wire_name`] so a host can register handlers under
//! either spelling; the canonical names are the ones this crate speaks.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named signal from the billing system indicating a required
/// resource-state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleEvent {
    /// Allocate and bind a server resource.
    Provision,
    /// Tear down the bound resource (policy decides wipe vs ticket).
    Terminate,
    /// Suspend the bound resource.
    Suspend,
    /// Lift a suspension on the bound resource.
    Unsuspend,
    /// Reconcile resource usage against the billing identifier.
    UsageUpdate,
}

impl LifecycleEvent {
    /// Every event, in dispatch-table order.
    pub const ALL: [LifecycleEvent; 5] = [
        LifecycleEvent::Provision,
        LifecycleEvent::Terminate,
        LifecycleEvent::Suspend,
        LifecycleEvent::Unsuspend,
        LifecycleEvent::UsageUpdate,
    ];

    /// The canonical event name.
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Provision => "provision",
            LifecycleEvent::Terminate => "terminate",
            LifecycleEvent::Suspend => "suspend",
            LifecycleEvent::Unsuspend => "unsuspend",
            LifecycleEvent::UsageUpdate => "usage-update",
        }
    }

    /// The billing system's internal name for this event.
    pub fn wire_name(&self) -> &'static str {
        match self {
            LifecycleEvent::Provision => "CreateAccount",
            LifecycleEvent::Terminate => "TerminateAccount",
            LifecycleEvent::Suspend => "SuspendAccount",
            LifecycleEvent::Unsuspend => "UnsuspendAccount",
            LifecycleEvent::UsageUpdate => "UsageUpdate",
        }
    }

    /// The handler operation bound to this event.
    pub fn operation(&self) -> &'static str {
        match self {
            LifecycleEvent::Provision => "provision",
            LifecycleEvent::Terminate => "terminate",
            LifecycleEvent::Suspend => "suspend",
            LifecycleEvent::Unsuspend => "unsuspend",
            LifecycleEvent::UsageUpdate => "usage",
        }
    }

    /// Resolve an event from the billing system's internal name.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.wire_name() == name)
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a name matches no known lifecycle event.
///
/// Unknown names are the host framework's problem; this crate refuses
/// to dispatch them rather than guessing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown lifecycle event: {0}")]
pub struct UnknownEvent(pub String);

impl FromStr for LifecycleEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.name() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

/// Pure name → operation dispatch table for the host framework.
///
/// Callable without constructing any collaborator; repeated calls yield
/// an identical map.
pub fn functions() -> BTreeMap<&'static str, &'static str> {
    LifecycleEvent::ALL
        .iter()
        .map(|e| (e.name(), e.operation()))
        .collect()
}

/// The normalized result of handling one lifecycle event.
///
/// An outcome has exactly two shapes: the literal success token, or a
/// human-readable failure message. This is the only wire contract back
/// to the host framework - no structured error code, no raised fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The event was handled; renders as [`Outcome::SUCCESS_TOKEN`].
    Success,
    /// The event was not handled; carries exactly why.
    Failure(String),
}

impl Outcome {
    /// The literal token the host framework treats as success.
    pub const SUCCESS_TOKEN: &'static str = "success";

    /// Build a failure outcome from any displayable message.
    pub fn failure(message: impl Into<String>) -> Self {
        Outcome::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The outcome as the host framework sees it.
    pub fn as_str(&self) -> &str {
        match self {
            Outcome::Success => Self::SUCCESS_TOKEN,
            Outcome::Failure(message) => message,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// anyhow Display prints the outermost message, which is exactly the
// verbatim fault text the host contract wants.
impl From<anyhow::Error> for Outcome {
    fn from(err: anyhow::Error) -> Self {
        Outcome::Failure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_functions_covers_every_event() {
        let table = functions();
        let keys: Vec<&str> = table.keys().copied().collect();
        assert_eq!(
            keys,
            vec!["provision", "suspend", "terminate", "unsuspend", "usage-update"]
        );
    }

    #[test]
    fn test_functions_values_name_handler_operations() {
        let table = functions();
        assert_eq!(table["provision"], "provision");
        assert_eq!(table["terminate"], "terminate");
        assert_eq!(table["suspend"], "suspend");
        assert_eq!(table["unsuspend"], "unsuspend");
        assert_eq!(table["usage-update"], "usage");
    }

    #[test]
    fn test_functions_is_idempotent() {
        assert_eq!(functions(), functions());
    }

    #[test]
    fn test_canonical_name_round_trip() {
        for event in LifecycleEvent::ALL {
            let parsed: LifecycleEvent = event.name().parse().unwrap();
            assert_eq!(parsed, event);
        }
    }

    #[test]
    fn test_wire_name_round_trip() {
        for event in LifecycleEvent::ALL {
            assert_eq!(LifecycleEvent::from_wire_name(event.wire_name()), Some(event));
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = "reboot".parse::<LifecycleEvent>().unwrap_err();
        assert_eq!(err.to_string(), "unknown lifecycle event: reboot");
        assert_eq!(LifecycleEvent::from_wire_name("RebootAccount"), None);
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&LifecycleEvent::UsageUpdate).unwrap();
        assert_eq!(json, "\"usage-update\"");
        let back: LifecycleEvent = serde_json::from_str("\"provision\"").unwrap();
        assert_eq!(back, LifecycleEvent::Provision);
    }

    #[test]
    fn test_outcome_renders_token_or_message() {
        assert_eq!(Outcome::Success.as_str(), "success");
        assert_eq!(Outcome::failure("it broke").as_str(), "it broke");
        assert_eq!(Outcome::Success.to_string(), "success");
    }

    #[test]
    fn test_outcome_from_anyhow_is_verbatim() {
        let err = anyhow::anyhow!("backend unreachable");
        let outcome = Outcome::from(err);
        assert_eq!(outcome, Outcome::failure("backend unreachable"));
        assert!(outcome.is_failure());
    }
}
