//! # Contract Policy
//!
//! Host-tunable rules layered on top of the fixed transition graph.
//!
//! The only knob today is sign-on gating. By default signers may be added to
//! a contract in any state, which allows late amendments to a signed
//! contract. Hosts that want signer lists frozen at signing choose
//! [`SignOnPolicy::UnsignedOnly`].
//!
//! ```yaml
//! sign_on: unsigned_only
//! ```

use serde::{Deserialize, Serialize};

use crate::contract::ContractState;

/// When signers may be added to a contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignOnPolicy {
    /// Signers may be added in any state.
    #[default]
    Permissive,
    /// Signers may only be added while the contract is `Unsigned`.
    UnsignedOnly,
}

impl SignOnPolicy {
    /// Whether a signer may be added to a contract in `state`.
    pub fn allows(&self, state: &ContractState) -> bool {
        match self {
            Self::Permissive => true,
            Self::UnsignedOnly => matches!(state, ContractState::Unsigned),
        }
    }
}

/// Policy handed to [`ContractSystem`](crate::system::ContractSystem) at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractPolicy {
    /// Sign-on gating.
    pub sign_on: SignOnPolicy,
}

impl ContractPolicy {
    /// Policy that freezes signer lists once the contract leaves `Unsigned`.
    pub fn strict() -> Self {
        Self {
            sign_on: SignOnPolicy::UnsignedOnly,
        }
    }
}
