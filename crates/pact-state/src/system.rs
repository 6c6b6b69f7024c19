//! # Contract State Machine
//!
//! [`ContractSystem`] enforces the legal transition graph and notifies
//! observers of every accepted transition. It holds no per-contract state;
//! everything lives in the [`Contract`] it is handed.
//!
//! ## Transitions
//!
//! | Operation                | From       | To                   |
//! |--------------------------|------------|----------------------|
//! | `try_sign_contract`      | `Unsigned` | `Signed`             |
//! | `try_breach_contract`    | `Signed`   | `Breached { party }` |
//! | `try_close_out_contract` | `Signed`   | `ClosedOut`          |
//!
//! Anything else is rejected with [`TransitionError::CannotTransitionFrom`].
//! Rejections never mutate the contract and never notify.
//!
//! ## Concurrency
//!
//! Operations take `&mut Contract`, so two transitions on the same contract
//! cannot interleave. Hosts that share contracts across threads go through
//! [`ContractRegistry`](crate::registry::ContractRegistry).

use std::sync::Arc;

use thiserror::Error;

use pact_core::{SignerId, Timestamp};

use crate::contract::{Contract, ContractState, ContractTransitionRecord, Party};
use crate::observer::{ContractObserver, ContractStateChanged};
use crate::policy::ContractPolicy;
use crate::signer::SignerValidity;

// ─── Errors ──────────────────────────────────────────────────────────

/// Why a transition was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// The operation does not accept the contract's current state.
    #[error("cannot transition from {0}")]
    CannotTransitionFrom(ContractState),

    /// Signing requires at least one party A signer.
    #[error("party A has no signers")]
    NoPartyA,

    /// Signing requires at least one party B signer.
    #[error("party B has no signers")]
    NoPartyB,
}

impl TransitionError {
    /// Stable snake_case name, for scripted expectations and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CannotTransitionFrom(_) => "cannot_transition_from",
            Self::NoPartyA => "no_party_a",
            Self::NoPartyB => "no_party_b",
        }
    }
}

/// Why a sign-on was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOnError {
    /// The signer is deleted or was never known to the host.
    #[error("{0} is not a valid signer")]
    InvalidSigner(SignerId),

    /// The policy forbids adding signers in the contract's current state.
    #[error("contract is {0}; signers can no longer be added")]
    ContractLocked(ContractState),
}

impl SignOnError {
    /// Stable snake_case name, for scripted expectations and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidSigner(_) => "invalid_signer",
            Self::ContractLocked(_) => "contract_locked",
        }
    }
}

// ─── Contract System ─────────────────────────────────────────────────

/// The contract state machine.
///
/// Collaborators are passed in at construction: `V` decides whether a
/// signer reference is still alive, and the [`ContractPolicy`] sets sign-on
/// gating. Observers are added with [`subscribe`](Self::subscribe) and are
/// notified in registration order.
pub struct ContractSystem<V> {
    validity: V,
    policy: ContractPolicy,
    observers: Vec<Arc<dyn ContractObserver>>,
}

impl<V: SignerValidity> ContractSystem<V> {
    /// Create a system with no observers.
    pub fn new(validity: V, policy: ContractPolicy) -> Self {
        Self {
            validity,
            policy,
            observers: Vec::new(),
        }
    }

    /// Register an observer for every subsequent transition.
    pub fn subscribe(&mut self, observer: Arc<dyn ContractObserver>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn policy(&self) -> &ContractPolicy {
        &self.policy
    }

    pub fn validity(&self) -> &V {
        &self.validity
    }

    /// Append `signer` to `party`, reporting why on rejection.
    ///
    /// Does not change the contract state.
    pub fn try_sign_on(
        &self,
        contract: &mut Contract,
        signer: SignerId,
        party: Party,
    ) -> Result<(), SignOnError> {
        if !self.validity.is_valid(&signer) {
            tracing::warn!(contract = %contract.id, signer = %signer, "rejected invalid signer");
            return Err(SignOnError::InvalidSigner(signer));
        }
        if !self.policy.sign_on.allows(&contract.state) {
            return Err(SignOnError::ContractLocked(contract.state));
        }

        contract.signers_mut(party).push(signer);
        tracing::debug!(contract = %contract.id, signer = %signer, %party, "signer added");
        Ok(())
    }

    /// Append `signer` to `party`. Returns `false`, leaving the contract
    /// untouched, if the signer is invalid or the policy forbids it.
    pub fn sign_on(&self, contract: &mut Contract, signer: SignerId, party: Party) -> bool {
        self.try_sign_on(contract, signer, party).is_ok()
    }

    /// Make the contract binding (UNSIGNED → SIGNED).
    ///
    /// # Errors
    ///
    /// `CannotTransitionFrom` if the contract is not `Unsigned`, then
    /// `NoPartyA` / `NoPartyB` if either side has no signers.
    pub fn try_sign_contract(&self, contract: &mut Contract) -> Result<(), TransitionError> {
        if contract.state != ContractState::Unsigned {
            return Err(TransitionError::CannotTransitionFrom(contract.state));
        }
        if contract.party_a.is_empty() {
            return Err(TransitionError::NoPartyA);
        }
        if contract.party_b.is_empty() {
            return Err(TransitionError::NoPartyB);
        }

        self.transition(contract, ContractState::Signed);
        Ok(())
    }

    /// Record that `breaching_party` broke the terms (SIGNED → BREACHED).
    pub fn try_breach_contract(
        &self,
        contract: &mut Contract,
        breaching_party: Party,
    ) -> Result<(), TransitionError> {
        self.require_signed(contract)?;
        self.transition(contract, ContractState::Breached { breaching_party });
        Ok(())
    }

    /// Conclude the contract normally (SIGNED → CLOSED_OUT).
    pub fn try_close_out_contract(&self, contract: &mut Contract) -> Result<(), TransitionError> {
        self.require_signed(contract)?;
        self.transition(contract, ContractState::ClosedOut);
        Ok(())
    }

    fn require_signed(&self, contract: &Contract) -> Result<(), TransitionError> {
        if contract.state != ContractState::Signed {
            return Err(TransitionError::CannotTransitionFrom(contract.state));
        }
        Ok(())
    }

    /// Commit `new` and notify observers. Only called after validation.
    fn transition(&self, contract: &mut Contract, new: ContractState) {
        let old = std::mem::replace(&mut contract.state, new);
        contract.transitions.push(ContractTransitionRecord {
            from: old,
            to: new,
            timestamp: Timestamp::now(),
        });
        tracing::debug!(contract = %contract.id, from = %old, to = %new, "contract transitioned");

        let event = ContractStateChanged {
            contract: &*contract,
            old,
            new,
        };
        for observer in &self.observers {
            observer.on_state_changed(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::TransitionJournal;
    use crate::policy::SignOnPolicy;
    use crate::signer::SignerRegistry;

    struct Harness {
        system: ContractSystem<SignerRegistry>,
        signers: SignerRegistry,
        journal: Arc<TransitionJournal>,
    }

    fn harness(policy: ContractPolicy) -> Harness {
        let signers = SignerRegistry::new();
        let journal = Arc::new(TransitionJournal::new());
        let mut system = ContractSystem::new(signers.clone(), policy);
        system.subscribe(journal.clone());
        Harness {
            system,
            signers,
            journal,
        }
    }

    fn staffed_contract(h: &Harness) -> Contract {
        let mut contract = Contract::new();
        assert!(h.system.sign_on(&mut contract, h.signers.register(), Party::PartyA));
        assert!(h.system.sign_on(&mut contract, h.signers.register(), Party::PartyB));
        contract
    }

    fn signed_contract(h: &Harness) -> Contract {
        let mut contract = staffed_contract(h);
        h.system.try_sign_contract(&mut contract).unwrap();
        contract
    }

    // ── Sign-on ──────────────────────────────────────────────────────

    #[test]
    fn test_sign_on_appends_in_order() {
        let h = harness(ContractPolicy::default());
        let mut contract = Contract::new();
        let first = h.signers.register();
        let second = h.signers.register();

        assert!(h.system.sign_on(&mut contract, first, Party::PartyA));
        assert!(h.system.sign_on(&mut contract, second, Party::PartyA));
        assert_eq!(contract.party_a(), &[first, second]);
        assert!(contract.party_b().is_empty());
        assert_eq!(contract.state(), ContractState::Unsigned);
    }

    #[test]
    fn test_sign_on_keeps_duplicates() {
        let h = harness(ContractPolicy::default());
        let mut contract = Contract::new();
        let signer = h.signers.register();

        assert!(h.system.sign_on(&mut contract, signer, Party::PartyB));
        assert!(h.system.sign_on(&mut contract, signer, Party::PartyB));
        assert_eq!(contract.party_b(), &[signer, signer]);
    }

    #[test]
    fn test_sign_on_rejects_retired_signer() {
        let h = harness(ContractPolicy::default());
        let mut contract = Contract::new();
        let signer = h.signers.register();
        h.signers.retire(&signer);

        assert!(!h.system.sign_on(&mut contract, signer, Party::PartyA));
        assert!(contract.party_a().is_empty());
        assert_eq!(
            h.system.try_sign_on(&mut contract, signer, Party::PartyA),
            Err(SignOnError::InvalidSigner(signer))
        );
    }

    #[test]
    fn test_sign_on_rejects_unknown_signer() {
        let h = harness(ContractPolicy::default());
        let mut contract = Contract::new();
        assert!(!h.system.sign_on(&mut contract, SignerId::new(), Party::PartyB));
        assert!(contract.party_b().is_empty());
    }

    #[test]
    fn test_permissive_sign_on_after_signing() {
        let h = harness(ContractPolicy::default());
        let mut contract = signed_contract(&h);
        let late = h.signers.register();

        assert!(h.system.sign_on(&mut contract, late, Party::PartyB));
        assert_eq!(contract.party_b().len(), 2);
        assert_eq!(contract.state(), ContractState::Signed);
    }

    #[test]
    fn test_strict_sign_on_after_signing_is_locked() {
        let h = harness(ContractPolicy {
            sign_on: SignOnPolicy::UnsignedOnly,
        });
        let mut contract = signed_contract(&h);
        let late = h.signers.register();

        assert_eq!(
            h.system.try_sign_on(&mut contract, late, Party::PartyB),
            Err(SignOnError::ContractLocked(ContractState::Signed))
        );
        assert_eq!(contract.party_b().len(), 1);
    }

    #[test]
    fn test_sign_on_does_not_notify() {
        let h = harness(ContractPolicy::default());
        let _ = staffed_contract(&h);
        assert!(h.journal.is_empty());
    }

    // ── Signing ──────────────────────────────────────────────────────

    #[test]
    fn test_sign_without_any_party() {
        let h = harness(ContractPolicy::default());
        let mut contract = Contract::new();
        assert_eq!(
            h.system.try_sign_contract(&mut contract),
            Err(TransitionError::NoPartyA)
        );
        assert_eq!(contract.state(), ContractState::Unsigned);
        assert!(h.journal.is_empty());
    }

    #[test]
    fn test_sign_without_party_b() {
        let h = harness(ContractPolicy::default());
        let mut contract = Contract::new();
        h.system
            .try_sign_on(&mut contract, h.signers.register(), Party::PartyA)
            .unwrap();
        assert_eq!(
            h.system.try_sign_contract(&mut contract),
            Err(TransitionError::NoPartyB)
        );
        assert_eq!(contract.state(), ContractState::Unsigned);
    }

    #[test]
    fn test_sign_without_party_a() {
        let h = harness(ContractPolicy::default());
        let mut contract = Contract::new();
        h.system
            .try_sign_on(&mut contract, h.signers.register(), Party::PartyB)
            .unwrap();
        assert_eq!(
            h.system.try_sign_contract(&mut contract),
            Err(TransitionError::NoPartyA)
        );
    }

    #[test]
    fn test_sign_emits_single_notification() {
        let h = harness(ContractPolicy::default());
        let contract = signed_contract(&h);

        assert_eq!(contract.state(), ContractState::Signed);
        let entries = h.journal.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].old, ContractState::Unsigned);
        assert_eq!(entries[0].new, ContractState::Signed);
        assert_eq!(entries[0].observed, ContractState::Signed);
    }

    #[test]
    fn test_sign_twice_rejected() {
        let h = harness(ContractPolicy::default());
        let mut contract = signed_contract(&h);
        assert_eq!(
            h.system.try_sign_contract(&mut contract),
            Err(TransitionError::CannotTransitionFrom(ContractState::Signed))
        );
        assert_eq!(h.journal.len(), 1);
    }

    // ── Breach / close-out ───────────────────────────────────────────

    #[test]
    fn test_breach_records_party() {
        let h = harness(ContractPolicy::default());
        let mut contract = signed_contract(&h);

        h.system
            .try_breach_contract(&mut contract, Party::PartyB)
            .unwrap();
        assert_eq!(
            contract.state(),
            ContractState::Breached {
                breaching_party: Party::PartyB
            }
        );
        let last = h.journal.entries().pop().unwrap();
        assert_eq!(last.old, ContractState::Signed);
        assert_eq!(last.new, contract.state());
    }

    #[test]
    fn test_close_out_from_signed() {
        let h = harness(ContractPolicy::default());
        let mut contract = signed_contract(&h);
        h.system.try_close_out_contract(&mut contract).unwrap();
        assert_eq!(contract.state(), ContractState::ClosedOut);
        assert!(contract.is_terminal());
    }

    #[test]
    fn test_breach_and_close_out_rejected_when_unsigned() {
        let h = harness(ContractPolicy::default());
        let mut contract = staffed_contract(&h);

        assert_eq!(
            h.system.try_breach_contract(&mut contract, Party::PartyA),
            Err(TransitionError::CannotTransitionFrom(ContractState::Unsigned))
        );
        assert_eq!(
            h.system.try_close_out_contract(&mut contract),
            Err(TransitionError::CannotTransitionFrom(ContractState::Unsigned))
        );
        assert_eq!(contract.state(), ContractState::Unsigned);
        assert!(h.journal.is_empty());
    }

    #[test]
    fn test_terminal_states_reject_everything_repeatedly() {
        let h = harness(ContractPolicy::default());
        let mut breached = signed_contract(&h);
        h.system
            .try_breach_contract(&mut breached, Party::PartyA)
            .unwrap();
        let mut closed = signed_contract(&h);
        h.system.try_close_out_contract(&mut closed).unwrap();
        let notified = h.journal.len();

        for contract in [&mut breached, &mut closed] {
            let frozen = contract.state();
            for _ in 0..10 {
                let expected = Err(TransitionError::CannotTransitionFrom(frozen));
                assert_eq!(h.system.try_sign_contract(contract), expected);
                assert_eq!(
                    h.system.try_breach_contract(contract, Party::PartyB),
                    expected
                );
                assert_eq!(h.system.try_close_out_contract(contract), expected);
                assert_eq!(contract.state(), frozen);
            }
        }
        assert_eq!(h.journal.len(), notified);
    }

    #[test]
    fn test_transition_log_tracks_accepted_transitions() {
        let h = harness(ContractPolicy::default());
        let mut contract = signed_contract(&h);
        let _ = h.system.try_sign_contract(&mut contract);
        h.system.try_close_out_contract(&mut contract).unwrap();

        let log = contract.transitions();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].from, ContractState::Unsigned);
        assert_eq!(log[0].to, ContractState::Signed);
        assert_eq!(log[1].from, ContractState::Signed);
        assert_eq!(log[1].to, ContractState::ClosedOut);
    }

    #[test]
    fn test_observers_notified_in_registration_order() {
        struct Tagged {
            tag: &'static str,
            seen: Arc<parking_lot::Mutex<Vec<&'static str>>>,
        }
        impl ContractObserver for Tagged {
            fn on_state_changed(&self, _event: &ContractStateChanged<'_>) {
                self.seen.lock().push(self.tag);
            }
        }

        let signers = SignerRegistry::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut system = ContractSystem::new(signers.clone(), ContractPolicy::default());
        for tag in ["payment", "audit", "ui"] {
            system.subscribe(Arc::new(Tagged {
                tag,
                seen: seen.clone(),
            }));
        }
        assert_eq!(system.observer_count(), 3);

        let mut contract = Contract::new();
        system.sign_on(&mut contract, signers.register(), Party::PartyA);
        system.sign_on(&mut contract, signers.register(), Party::PartyB);
        system.try_sign_contract(&mut contract).unwrap();

        assert_eq!(*seen.lock(), vec!["payment", "audit", "ui"]);
    }

    #[test]
    fn test_closure_validity_collaborator() {
        let allowed = SignerId::new();
        let system = ContractSystem::new(
            move |signer: &SignerId| *signer == allowed,
            ContractPolicy::default(),
        );
        let mut contract = Contract::new();
        assert!(system.sign_on(&mut contract, allowed, Party::PartyA));
        assert!(!system.sign_on(&mut contract, SignerId::new(), Party::PartyA));
        assert_eq!(contract.party_a(), &[allowed]);
    }

    // ── Errors ───────────────────────────────────────────────────────

    #[test]
    fn test_error_names_and_messages() {
        let err = TransitionError::CannotTransitionFrom(ContractState::Breached {
            breaching_party: Party::PartyB,
        });
        assert_eq!(err.name(), "cannot_transition_from");
        assert_eq!(err.to_string(), "cannot transition from BREACHED(PARTY_B)");
        assert_eq!(TransitionError::NoPartyA.name(), "no_party_a");
        assert_eq!(TransitionError::NoPartyB.name(), "no_party_b");
        assert_eq!(
            SignOnError::ContractLocked(ContractState::Signed).name(),
            "contract_locked"
        );
    }
}
