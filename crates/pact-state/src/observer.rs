//! # Change Notification
//!
//! Every accepted transition publishes a [`ContractStateChanged`] to the
//! observers registered on the owning
//! [`ContractSystem`](crate::system::ContractSystem). Delivery is synchronous
//! and happens after the new state is committed, before the transition call
//! returns.
//!
//! The event borrows the contract immutably. Observers read the committed
//! post-transition state and cannot start another transition on the same
//! contract from inside their handler.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use pact_core::ContractId;

use crate::contract::{Contract, ContractState};

/// A committed contract transition.
#[derive(Debug, Clone, Copy)]
pub struct ContractStateChanged<'a> {
    /// The contract, already in `new` state.
    pub contract: &'a Contract,
    /// State before the transition.
    pub old: ContractState,
    /// State after the transition.
    pub new: ContractState,
}

/// Receiver of contract state changes (payment, audit log, UI refresh).
pub trait ContractObserver: Send + Sync {
    fn on_state_changed(&self, event: &ContractStateChanged<'_>);
}

/// One entry in a [`TransitionJournal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub contract: ContractId,
    pub old: ContractState,
    pub new: ContractState,
    /// The contract's state as read from inside the handler.
    pub observed: ContractState,
}

/// In-memory audit log of every transition it is subscribed to.
#[derive(Debug, Default)]
pub struct TransitionJournal {
    entries: Mutex<Vec<JournalEntry>>,
}

impl TransitionJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, in delivery order.
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().clone()
    }

    /// Entries for one contract, in delivery order.
    pub fn for_contract(&self, id: ContractId) -> Vec<JournalEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.contract == id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl ContractObserver for TransitionJournal {
    fn on_state_changed(&self, event: &ContractStateChanged<'_>) {
        self.entries.lock().push(JournalEntry {
            contract: event.contract.id(),
            old: event.old,
            new: event.new,
            observed: event.contract.state(),
        });
    }
}
