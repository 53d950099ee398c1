//! Identities and the login/escalation protocol.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AuthError;

/// Password accepted for the root identity unless configuration overrides it.
pub const DEFAULT_ROOT_PASSWORD: &str = "admin";

/// Closed set of identities, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Identity {
    /// Nobody has authenticated yet.
    Nobody,
    /// Unprivileged account.
    User,
    /// Privileged account.
    Root,
}

impl Identity {
    /// Name as typed at the login prompt and shown in the shell prompt.
    pub fn name(self) -> &'static str {
        match self {
            Identity::Nobody => "none",
            Identity::User => "user",
            Identity::Root => "root",
        }
    }

    /// Whether logging in or switching to this identity needs a password.
    pub fn requires_password(self) -> bool {
        matches!(self, Identity::Root)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of an escalation or revert request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    /// The requested identity was already current; nothing changed.
    AlreadyActive,
    /// The current identity changed.
    Switched {
        /// Identity held before the switch.
        from: Identity,
        /// Identity held after the switch.
        to: Identity,
    },
}

/// Tracks the current and previous identity for the whole run.
///
/// Every successful login or escalation records the identity held right
/// before it as `previous`, which gives a single level of "switch back".
/// A login from [`Identity::Nobody`] records the new identity instead, since
/// there is nothing meaningful to return to.
#[derive(Debug, Clone)]
pub struct PrivilegeManager {
    current: Identity,
    previous: Identity,
    root_password: String,
}

impl Default for PrivilegeManager {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_PASSWORD)
    }
}

impl PrivilegeManager {
    /// Start unauthenticated with the given root password.
    pub fn new(root_password: impl Into<String>) -> Self {
        Self {
            current: Identity::Nobody,
            previous: Identity::Nobody,
            root_password: root_password.into(),
        }
    }

    /// Identity currently in effect.
    pub fn current(&self) -> Identity {
        self.current
    }

    /// Identity `su prv` returns to.
    pub fn previous(&self) -> Identity {
        self.previous
    }

    /// Map a typed login name to an identity.
    pub fn resolve(&self, name: &str) -> Result<Identity, AuthError> {
        match name.trim() {
            "root" => Ok(Identity::Root),
            "user" => Ok(Identity::User),
            other => Err(AuthError::InvalidIdentity(other.to_string())),
        }
    }

    /// Authenticate as `identity`, replacing the current identity on success.
    pub fn login(
        &mut self,
        identity: Identity,
        credential: Option<&str>,
    ) -> Result<Identity, AuthError> {
        self.verify(identity, credential)?;
        let prior = self.current;
        self.previous = if prior == Identity::Nobody {
            identity
        } else {
            prior
        };
        self.current = identity;
        info!(identity = %identity, previous = %self.previous, "login");
        Ok(identity)
    }

    /// Switch to `target` without logging out.
    pub fn escalate(
        &mut self,
        target: Identity,
        credential: Option<&str>,
    ) -> Result<Switch, AuthError> {
        if self.current == target {
            return Ok(Switch::AlreadyActive);
        }
        self.verify(target, credential)?;
        let from = self.current;
        self.previous = from;
        self.current = target;
        info!(from = %from, to = %target, "identity switched");
        Ok(Switch::Switched { from, to: target })
    }

    /// Swap current and previous identity.
    pub fn revert_to_previous(&mut self) -> Switch {
        if self.current == self.previous {
            return Switch::AlreadyActive;
        }
        let from = self.current;
        std::mem::swap(&mut self.current, &mut self.previous);
        info!(from = %from, to = %self.current, "reverted to previous identity");
        Switch::Switched {
            from,
            to: self.current,
        }
    }

    fn verify(&self, identity: Identity, credential: Option<&str>) -> Result<(), AuthError> {
        match identity {
            Identity::Nobody => Err(AuthError::InvalidIdentity(identity.name().to_string())),
            Identity::User => Ok(()),
            Identity::Root => {
                if credential == Some(self.root_password.as_str()) {
                    Ok(())
                } else {
                    Err(AuthError::WrongPassword)
                }
            }
        }
    }
}
