//! Structured router errors and the boundary rule.
//!
//! # The Error Boundary Rule
//!
//! > **No error ever crosses a handler boundary.**
//!
//! - `anyhow::Error` is internal transport (ergonomic for collaborators)
//! - [`RouterError`] gives the router's own faults stable, matchable
//!   shapes and exact messages
//! - The only externalized result is [`crate::Outcome`]
//!
//! The single exception is construction: a missing collaborator is a
//! deployment error, not a runtime event, so
//! [`crate::RouterBuilder::build`] surfaces it to the host.

use thiserror::Error;

/// Faults the router itself can raise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The configured delete action is outside the known set.
    ///
    /// Fatal within the terminate path; never defaults to a safe action.
    /// The message text is part of the host-facing contract.
    #[error("Unhandled delete action: {0}")]
    UnhandledDeleteAction(String),

    /// A collaborator was never wired in at the composition root.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unhandled_delete_action_message_is_exact() {
        let err = RouterError::UnhandledDeleteAction("bogus".to_string());
        assert_eq!(err.to_string(), "Unhandled delete action: bogus");
    }

    #[test]
    fn test_missing_collaborator_names_the_seam() {
        let err = RouterError::MissingCollaborator("provisioner");
        assert_eq!(err.to_string(), "missing collaborator: provisioner");
    }

    #[test]
    fn test_router_error_survives_anyhow_transport() {
        let err: anyhow::Error = RouterError::UnhandledDeleteAction("x".into()).into();
        assert!(err.downcast_ref::<RouterError>().is_some());
        assert_eq!(err.to_string(), "Unhandled delete action: x");
    }
}
