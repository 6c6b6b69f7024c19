//! # Contract Data Model
//!
//! A contract binds two parties. Each party is an ordered list of signers
//! (insertion order is signing order, duplicates allowed). The contract's
//! lifecycle state is a tagged enum, so a breached contract always knows
//! which party breached it.
//!
//! ## States
//!
//! ```text
//! Unsigned ──sign──▶ Signed ──breach(party)──▶ Breached { party }  (terminal)
//!                      │
//!                      └──close_out──▶ ClosedOut  (terminal)
//! ```
//!
//! Fields are only mutable from inside this crate. All changes go through
//! [`ContractSystem`](crate::system::ContractSystem).

use serde::{Deserialize, Serialize};

use pact_core::{ContractId, SignerId, Timestamp};

// ─── Party ───────────────────────────────────────────────────────────

/// One side of a two-party contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    /// The first party and author of the contract.
    PartyA,
    /// The second party and recipient of the contract.
    PartyB,
}

impl Party {
    /// The other side of the contract.
    pub fn counterparty(&self) -> Self {
        match self {
            Self::PartyA => Self::PartyB,
            Self::PartyB => Self::PartyA,
        }
    }

    /// Canonical name (`PARTY_A` / `PARTY_B`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::PartyA => "PARTY_A",
            Self::PartyB => "PARTY_B",
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Contract State ──────────────────────────────────────────────────

/// The lifecycle state of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContractState {
    /// Created but not yet binding. Initial state.
    #[default]
    Unsigned,
    /// Both parties have attested; terms are binding.
    Signed,
    /// A party violated the terms and is to be penalized (terminal).
    Breached {
        /// The party that breached.
        breaching_party: Party,
    },
    /// Concluded normally; rewards paid out (terminal).
    ClosedOut,
}

impl ContractState {
    /// Canonical state name, without payload.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unsigned => "UNSIGNED",
            Self::Signed => "SIGNED",
            Self::Breached { .. } => "BREACHED",
            Self::ClosedOut => "CLOSED_OUT",
        }
    }

    /// Whether this state is terminal (no outgoing transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Breached { .. } | Self::ClosedOut)
    }

    /// Whether the contract terms are currently binding.
    pub fn is_binding(&self) -> bool {
        matches!(self, Self::Signed)
    }

    /// Every state reachable from this one in a single transition.
    pub fn successors(&self) -> Vec<ContractState> {
        match self {
            Self::Unsigned => vec![Self::Signed],
            Self::Signed => vec![
                Self::Breached {
                    breaching_party: Party::PartyA,
                },
                Self::Breached {
                    breaching_party: Party::PartyB,
                },
                Self::ClosedOut,
            ],
            Self::Breached { .. } | Self::ClosedOut => Vec::new(),
        }
    }

    /// All five concrete states, in lifecycle order.
    pub fn all() -> [ContractState; 5] {
        [
            Self::Unsigned,
            Self::Signed,
            Self::Breached {
                breaching_party: Party::PartyA,
            },
            Self::Breached {
                breaching_party: Party::PartyB,
            },
            Self::ClosedOut,
        ]
    }
}

impl std::fmt::Display for ContractState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Breached { breaching_party } => write!(f, "BREACHED({breaching_party})"),
            other => f.write_str(other.name()),
        }
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of one accepted state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTransitionRecord {
    /// State before the transition.
    pub from: ContractState,
    /// State after the transition.
    pub to: ContractState,
    /// When the transition was committed.
    pub timestamp: Timestamp,
}

// ─── Contract ────────────────────────────────────────────────────────

/// A binding agreement between two parties.
///
/// Only [`ContractSystem`](crate::system::ContractSystem) changes a
/// contract's state, so there is no way to build one from serialized data:
///
/// ```compile_fail
/// let contract: pact_state::Contract = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Contract {
    pub(crate) id: ContractId,
    pub(crate) party_a: Vec<SignerId>,
    pub(crate) party_b: Vec<SignerId>,
    pub(crate) state: ContractState,
    pub(crate) created_at: Timestamp,
    pub(crate) transitions: Vec<ContractTransitionRecord>,
}

impl Contract {
    /// Create a fresh contract: `Unsigned`, no signers, empty log.
    pub fn new() -> Self {
        Self::with_id(ContractId::new())
    }

    /// Create a fresh contract under a caller-chosen identifier.
    pub fn with_id(id: ContractId) -> Self {
        Self {
            id,
            party_a: Vec::new(),
            party_b: Vec::new(),
            state: ContractState::Unsigned,
            created_at: Timestamp::now(),
            transitions: Vec::new(),
        }
    }

    pub fn id(&self) -> ContractId {
        self.id
    }

    pub fn state(&self) -> ContractState {
        self.state
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Signers for party A, in signing order.
    pub fn party_a(&self) -> &[SignerId] {
        &self.party_a
    }

    /// Signers for party B, in signing order.
    pub fn party_b(&self) -> &[SignerId] {
        &self.party_b
    }

    /// Signers for the given party, in signing order.
    pub fn signers(&self, party: Party) -> &[SignerId] {
        match party {
            Party::PartyA => &self.party_a,
            Party::PartyB => &self.party_b,
        }
    }

    /// Which parties `signer` has signed for. A signer may appear on both sides.
    pub fn parties_of(&self, signer: &SignerId) -> Vec<Party> {
        [Party::PartyA, Party::PartyB]
            .into_iter()
            .filter(|party| self.signers(*party).contains(signer))
            .collect()
    }

    /// Ordered log of accepted transitions.
    pub fn transitions(&self) -> &[ContractTransitionRecord] {
        &self.transitions
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub(crate) fn signers_mut(&mut self, party: Party) -> &mut Vec<SignerId> {
        match party {
            Party::PartyA => &mut self.party_a,
            Party::PartyB => &mut self.party_b,
        }
    }
}

impl Default for Contract {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_contract_is_unsigned_and_empty() {
        let contract = Contract::new();
        assert_eq!(contract.state(), ContractState::Unsigned);
        assert!(contract.party_a().is_empty());
        assert!(contract.party_b().is_empty());
        assert!(contract.transitions().is_empty());
        assert!(!contract.is_terminal());
    }

    #[test]
    fn test_with_id_keeps_id() {
        let id = ContractId::new();
        assert_eq!(Contract::with_id(id).id(), id);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ContractState::Unsigned.is_terminal());
        assert!(!ContractState::Signed.is_terminal());
        assert!(ContractState::ClosedOut.is_terminal());
        assert!(ContractState::Breached {
            breaching_party: Party::PartyA
        }
        .is_terminal());
    }

    #[test]
    fn test_only_signed_is_binding() {
        assert!(ContractState::Signed.is_binding());
        assert!(!ContractState::Unsigned.is_binding());
        assert!(!ContractState::ClosedOut.is_binding());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ContractState::Unsigned.to_string(), "UNSIGNED");
        assert_eq!(ContractState::Signed.to_string(), "SIGNED");
        assert_eq!(ContractState::ClosedOut.to_string(), "CLOSED_OUT");
        assert_eq!(
            ContractState::Breached {
                breaching_party: Party::PartyB
            }
            .to_string(),
            "BREACHED(PARTY_B)"
        );
    }

    #[test]
    fn test_successors() {
        assert_eq!(ContractState::Unsigned.successors(), vec![ContractState::Signed]);
        assert_eq!(ContractState::Signed.successors().len(), 3);
        assert!(!ContractState::Signed
            .successors()
            .contains(&ContractState::Unsigned));
    }

    #[test]
    fn test_terminal_states_have_no_successors() {
        for state in ContractState::all() {
            assert_eq!(state.is_terminal(), state.successors().is_empty());
        }
    }

    #[test]
    fn test_counterparty() {
        assert_eq!(Party::PartyA.counterparty(), Party::PartyB);
        assert_eq!(Party::PartyB.counterparty(), Party::PartyA);
    }

    #[test]
    fn test_parties_of_reports_both_sides() {
        let signer = SignerId::new();
        let mut contract = Contract::new();
        contract.signers_mut(Party::PartyA).push(signer);
        contract.signers_mut(Party::PartyB).push(signer);
        assert_eq!(contract.parties_of(&signer), vec![Party::PartyA, Party::PartyB]);
        assert!(contract.parties_of(&SignerId::new()).is_empty());
    }

    #[test]
    fn test_breached_state_serializes_with_party() {
        let state = ContractState::Breached {
            breaching_party: Party::PartyB,
        };
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"state": "breached", "breaching_party": "party_b"})
        );
    }
}
