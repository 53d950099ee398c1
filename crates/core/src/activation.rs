//! Novelty product activation.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use tracing::info;

use crate::error::ActivationError;

/// Keys the activation wizard accepts.
pub const ALLOWED_KEYS: [&str; 5] = [
    "2K9M4S-M52QP2-J6K3P2-R5TTKL-P1OLD4",
    "SK39K2-KS9-M39L",
    "STINGRAY-SPECIAL_HACK",
    "SLOS-SOPK-LOPS-ZNMI-IDDS",
    "#_2K28M",
];

/// Input that leaves the wizard without activating.
pub const ESCAPE_SENTINEL: &str = "N";

const KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const GROUP_COUNT: usize = 5;
const GROUP_LEN: usize = 5;

static GENERATED_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z0-9]{5}(-[A-Z0-9]{5}){4}$").expect("failed to compile product key regex")
});

/// Outcome of a wizard entry that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redeem {
    /// The key matched and is now active.
    Activated(String),
    /// The escape sentinel was entered.
    Cancelled,
}

/// Activation flag and the key that set it.
#[derive(Debug, Clone, Default)]
pub struct Activation {
    current_key: Option<String>,
}

impl Activation {
    /// Unactivated state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a key is active.
    pub fn is_activated(&self) -> bool {
        self.current_key.is_some()
    }

    /// Active key, or `none`.
    pub fn current_key(&self) -> &str {
        self.current_key.as_deref().unwrap_or("none")
    }

    /// Try a typed key against the allow-list.
    pub fn redeem(&mut self, candidate: &str) -> Result<Redeem, ActivationError> {
        let candidate = candidate.trim();
        if candidate == ESCAPE_SENTINEL {
            return Ok(Redeem::Cancelled);
        }
        if !ALLOWED_KEYS.contains(&candidate) {
            return Err(ActivationError::NotFound);
        }
        self.activate(candidate.to_string());
        Ok(Redeem::Activated(candidate.to_string()))
    }

    /// Generate a fresh key and activate with it unconditionally.
    pub fn instant_unlock<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        let key = generate_key(rng);
        self.activate(key.clone());
        key
    }

    /// Drop the active key.
    pub fn deactivate(&mut self) -> Result<(), ActivationError> {
        if self.current_key.take().is_none() {
            return Err(ActivationError::NotActive);
        }
        info!("system deactivated");
        Ok(())
    }

    fn activate(&mut self, key: String) {
        info!(key = %key, "system activated");
        self.current_key = Some(key);
    }
}

/// Five hyphen-joined groups of five characters from `[A-Z0-9]`.
pub fn generate_key<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..GROUP_COUNT)
        .map(|_| {
            (0..GROUP_LEN)
                .map(|_| KEY_ALPHABET[rng.gen_range(0..KEY_ALPHABET.len())] as char)
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Whether `key` has the shape produced by [`generate_key`].
pub fn is_generated_shape(key: &str) -> bool {
    GENERATED_KEY_RE.is_match(key)
}
