//! Configuration seam and the terminate delete policy.
//!
//! Configuration lives behind [`ConfigSource`] so deployments can back
//! it with whatever store the host uses. The delete action is re-read on
//! every terminate - never cached - so live configuration changes take
//! effect immediately.

use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::RouterError;

/// Module option selecting the terminate behavior.
pub const KEY_DELETE_ACTION: &str = "delete_action";

/// Global setting naming the client id cancellation tickets are filed under.
pub const KEY_USER_ID: &str = "userid";

/// Read access to module options and global settings.
///
/// Reads are synchronous and bounded; a missing key is a fault, not an
/// empty success.
pub trait ConfigSource: Send + Sync {
    /// Read a module-level option.
    fn option(&self, key: &str) -> Result<String>;

    /// Read a global setting.
    fn get(&self, key: &str) -> Result<String>;
}

/// What terminating an account does to its server.
///
/// Any raw value outside this set is a fatal configuration fault - the
/// router never silently falls back to a "safe" action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteAction {
    /// Wipe the bound server immediately.
    Wipe,
    /// Leave the server alone and open a cancellation ticket for a human.
    Ticket,
}

impl FromStr for DeleteAction {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wipe" => Ok(DeleteAction::Wipe),
            "ticket" => Ok(DeleteAction::Ticket),
            _ => Err(RouterError::UnhandledDeleteAction(s.to_string())),
        }
    }
}

impl fmt::Display for DeleteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteAction::Wipe => f.write_str("wipe"),
            DeleteAction::Ticket => f.write_str("ticket"),
        }
    }
}

/// Environment-backed configuration.
///
/// Keys are uppercased (`delete_action` → `DELETE_ACTION`), with an
/// optional deployment prefix. Options and settings share the same
/// namespace here; richer stores can split them.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    prefix: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace every lookup, e.g. `TURNSTILE_` → `TURNSTILE_DELETE_ACTION`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key.to_ascii_uppercase().replace('-', "_"))
    }

    fn read(&self, key: &str) -> Result<String> {
        let var = self.var_name(key);
        env::var(&var).with_context(|| format!("{var} must be set"))
    }
}

impl ConfigSource for EnvConfig {
    fn option(&self, key: &str) -> Result<String> {
        self.read(key)
    }

    fn get(&self, key: &str) -> Result<String> {
        self.read(key)
    }
}
