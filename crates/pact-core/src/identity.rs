//! # Identity Newtypes
//!
//! Newtype wrappers for the identifiers used by the contract state machine.
//! You cannot pass a `SignerId` where a `ContractId` is expected.
//!
//! Signers are durable identities (minds, factions), never transient actors:
//! a signer must outlive every contract it has signed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractId(pub Uuid);

/// Unique identifier for a signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignerId(pub Uuid);

impl ContractId {
    /// Generate a new random contract identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ContractId {
    fn default() -> Self {
        Self::new()
    }
}

impl SignerId {
    /// Generate a new random signer identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SignerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "contract:{}", self.0)
    }
}

impl std::fmt::Display for SignerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "signer:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_distinct() {
        assert_ne!(ContractId::new(), ContractId::new());
        assert_ne!(SignerId::new(), SignerId::new());
    }

    #[test]
    fn test_display_prefixes() {
        let uuid = Uuid::nil();
        assert_eq!(
            ContractId(uuid).to_string(),
            "contract:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            SignerId(uuid).to_string(),
            "signer:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_as_uuid() {
        let id = SignerId::new();
        assert_eq!(*id.as_uuid(), id.0);
    }
}
