//! Domain errors reported in-band by the session handlers.
//!
//! None of these are fatal: every variant is recovered by re-prompting or by
//! printing a notice and returning to the owning prompt. Collaborator I/O
//! failures travel separately as [`anyhow::Error`].

use thiserror::Error;

use crate::identity::Identity;

/// Failures from the login and escalation protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The typed name is not one of the known identities.
    #[error("Invalid User!")]
    InvalidIdentity(String),
    /// A privileged identity was requested with the wrong password.
    #[error("Wrong Password!")]
    WrongPassword,
}

/// Failures from the economy purchase path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PurchaseError {
    /// The balance does not strictly exceed the price.
    #[error("Not Enough Coins to buy this!")]
    InsufficientFunds {
        /// Catalog price of the requested upgrade.
        price: f64,
        /// Balance at the time of the attempt.
        balance: f64,
    },
    /// No catalog entry carries this id.
    #[error("Invalid ID")]
    UnknownUpgrade(String),
}

/// Failures from the activation component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    /// The candidate key is not on the allow-list.
    #[error("Activation was unsuccessful. Press N to exit the product Key wizard.")]
    NotFound,
    /// Deactivation requested while no key is active.
    #[error("You dont have any product key! So you cannot deactivate the system right now.")]
    NotActive,
}

/// Failures from command lookup in the normal shell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The head token matches no registered command.
    #[error("Invalid IPTV Command. Type help or cmds for the list of commands.")]
    Unknown(String),
    /// The current identity is below the command's required privilege.
    #[error("Permission denied: {command} requires {required}. Use su {required} first.")]
    PermissionDenied {
        /// Canonical command name.
        command: String,
        /// Minimum identity the command needs.
        required: Identity,
    },
}
