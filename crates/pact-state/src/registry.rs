//! # Contract Registry
//!
//! In-memory contract store backed by `DashMap`, for hosts that touch
//! contracts from more than one thread.
//!
//! [`ContractRegistry::with_contract`] runs its closure under the entry's
//! write lock, so validation, mutation, and observer notification for one
//! contract never interleave with another transition on the same contract.
//! Observers invoked from inside that closure must not call back into the
//! registry: the shard lock is held.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

use pact_core::ContractId;

use crate::contract::{Contract, ContractState};

/// Errors from registry lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{0} not found")]
    NotFound(ContractId),

    #[error("{0} already exists")]
    AlreadyExists(ContractId),
}

/// Thread-safe store of contracts keyed by id.
#[derive(Debug, Default)]
pub struct ContractRegistry {
    contracts: DashMap<ContractId, Contract>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and store a fresh `Unsigned` contract.
    pub fn create(&self) -> ContractId {
        let contract = Contract::new();
        let id = contract.id();
        self.contracts.insert(id, contract);
        tracing::debug!(contract = %id, "contract created");
        id
    }

    /// Store an existing contract under its own id.
    pub fn insert(&self, contract: Contract) -> Result<(), RegistryError> {
        match self.contracts.entry(contract.id()) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyExists(contract.id())),
            Entry::Vacant(slot) => {
                slot.insert(contract);
                Ok(())
            }
        }
    }

    /// Snapshot of a contract.
    pub fn get(&self, id: ContractId) -> Option<Contract> {
        self.contracts.get(&id).map(|entry| entry.value().clone())
    }

    pub fn state(&self, id: ContractId) -> Option<ContractState> {
        self.contracts.get(&id).map(|entry| entry.state())
    }

    /// Run `f` with exclusive access to one contract.
    pub fn with_contract<R>(
        &self,
        id: ContractId,
        f: impl FnOnce(&mut Contract) -> R,
    ) -> Result<R, RegistryError> {
        let mut entry = self
            .contracts
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        Ok(f(entry.value_mut()))
    }

    /// Remove a contract, returning it.
    pub fn remove(&self, id: ContractId) -> Option<Contract> {
        self.contracts.remove(&id).map(|(_, contract)| contract)
    }

    /// All contract ids, sorted.
    pub fn ids(&self) -> Vec<ContractId> {
        let mut ids: Vec<ContractId> = self.contracts.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_stores_unsigned_contract() {
        let registry = ContractRegistry::new();
        let id = registry.create();
        assert_eq!(registry.state(id), Some(ContractState::Unsigned));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let registry = ContractRegistry::new();
        let contract = Contract::new();
        let id = contract.id();
        registry.insert(contract.clone()).unwrap();
        assert_eq!(
            registry.insert(contract),
            Err(RegistryError::AlreadyExists(id))
        );
    }

    #[test]
    fn test_with_contract_missing() {
        let registry = ContractRegistry::new();
        let id = ContractId::new();
        assert_eq!(
            registry.with_contract(id, |_| ()),
            Err(RegistryError::NotFound(id))
        );
    }

    #[test]
    fn test_remove() {
        let registry = ContractRegistry::new();
        let id = registry.create();
        assert_eq!(registry.remove(id).map(|c| c.id()), Some(id));
        assert!(registry.is_empty());
        assert!(registry.get(id).is_none());
    }

    #[test]
    fn test_ids_sorted() {
        let registry = ContractRegistry::new();
        for _ in 0..5 {
            registry.create();
        }
        let ids = registry.ids();
        assert_eq!(ids.len(), 5);
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
