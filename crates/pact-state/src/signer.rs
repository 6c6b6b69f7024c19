//! # Signer Validity
//!
//! The state machine never appends a deleted or unknown signer. Whether a
//! signer is still alive is the host's knowledge, so it is supplied as an
//! explicit collaborator through [`SignerValidity`].
//!
//! [`SignerRegistry`] is a ready-made implementation for hosts (and tests)
//! that do not already track signer lifetimes. Any `Fn(&SignerId) -> bool`
//! closure also works.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use pact_core::SignerId;

/// Answers "is this signer reference still alive and usable".
pub trait SignerValidity: Send + Sync {
    /// Whether `signer` may be appended to a contract.
    fn is_valid(&self, signer: &SignerId) -> bool;
}

impl<F> SignerValidity for F
where
    F: Fn(&SignerId) -> bool + Send + Sync,
{
    fn is_valid(&self, signer: &SignerId) -> bool {
        self(signer)
    }
}

/// Lifecycle status of a registered signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerStatus {
    /// The signer exists and may sign.
    Live,
    /// The signer has been deleted by the host.
    Retired,
}

/// Thread-safe registry of signer lifetimes.
///
/// Cloning yields another handle onto the same registry, so the host can
/// keep retiring signers after handing a clone to a `ContractSystem`.
/// Unknown signers are invalid.
#[derive(Debug, Clone, Default)]
pub struct SignerRegistry {
    signers: Arc<DashMap<SignerId, SignerStatus>>,
}

impl SignerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint and register a fresh live signer.
    pub fn register(&self) -> SignerId {
        let id = SignerId::new();
        self.signers.insert(id, SignerStatus::Live);
        id
    }

    /// Register an externally minted signer as live.
    ///
    /// Returns `false` if the signer was already known. A retired signer
    /// stays retired.
    pub fn insert(&self, id: SignerId) -> bool {
        let mut inserted = false;
        self.signers.entry(id).or_insert_with(|| {
            inserted = true;
            SignerStatus::Live
        });
        inserted
    }

    /// Mark a signer as deleted.
    ///
    /// Returns `false` if the signer was unknown or already retired.
    pub fn retire(&self, id: &SignerId) -> bool {
        match self.signers.get_mut(id) {
            Some(mut status) if *status == SignerStatus::Live => {
                *status = SignerStatus::Retired;
                tracing::debug!(signer = %id, "signer retired");
                true
            }
            _ => false,
        }
    }

    /// Current status, or `None` if the signer was never registered.
    pub fn status(&self, id: &SignerId) -> Option<SignerStatus> {
        self.signers.get(id).map(|status| *status)
    }

    /// Whether the signer is registered and not retired.
    pub fn is_live(&self, id: &SignerId) -> bool {
        self.status(id) == Some(SignerStatus::Live)
    }

    /// Number of registered signers, live or retired.
    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}

impl SignerValidity for SignerRegistry {
    fn is_valid(&self, signer: &SignerId) -> bool {
        self.is_live(signer)
    }
}
