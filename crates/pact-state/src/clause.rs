//! # Criteria and Breaching Clauses
//!
//! A signed contract concludes one of two ways. Fulfilment criteria are
//! flipped to satisfied by whatever gameplay tracks them (a delivery, a
//! bounty); once every criterion is satisfied the contract can be closed
//! out. Breaching clauses name a liable party; triggering one breaches the
//! contract against that party.
//!
//! [`ClauseBook`] holds both for one contract, and
//! [`ContractSystem::evaluate_clauses`] turns the book into a transition.
//!
//! ## Evaluation order
//!
//! 1. Contract must be `Signed`.
//! 2. The first triggered breaching clause, in insertion order, breaches.
//! 3. Otherwise, a non-empty, fully satisfied criteria list closes out.
//! 4. Otherwise nothing happens.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pact_core::ContractId;

use crate::contract::{Contract, ContractState, Party};
use crate::signer::SignerValidity;
use crate::system::{ContractSystem, TransitionError};

/// A fulfilment condition of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCriteria {
    pub description: String,
    /// Updated by the gameplay systems that track this condition.
    pub satisfied: bool,
}

/// A condition whose violation breaches the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachingClause {
    pub description: String,
    /// The party penalized if the clause triggers.
    pub liable_party: Party,
    pub triggered: bool,
}

/// What [`ContractSystem::evaluate_clauses`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseOutcome {
    /// No clause fired; the contract is still `Signed`.
    Pending,
    /// A breaching clause fired against this party.
    Breached(Party),
    /// Every criterion was satisfied.
    ClosedOut,
}

impl ClauseOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Breached(_) => "breached",
            Self::ClosedOut => "closed_out",
        }
    }
}

/// Errors from clause bookkeeping and evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClauseError {
    /// The book belongs to a different contract.
    #[error("clause book for {expected} evaluated against {found}")]
    WrongContract {
        /// Contract the book was created for.
        expected: ContractId,
        /// Contract it was evaluated against.
        found: ContractId,
    },

    #[error("no criterion at index {0}")]
    UnknownCriterion(usize),

    #[error("no breaching clause at index {0}")]
    UnknownClause(usize),

    /// The contract rejected the resulting transition.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl ClauseError {
    /// Stable snake_case name. Transition failures report the inner name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::WrongContract { .. } => "wrong_contract",
            Self::UnknownCriterion(_) => "unknown_criterion",
            Self::UnknownClause(_) => "unknown_clause",
            Self::Transition(inner) => inner.name(),
        }
    }
}

/// Criteria and breaching clauses attached to one contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClauseBook {
    owning_contract: ContractId,
    criteria: Vec<ContractCriteria>,
    clauses: Vec<BreachingClause>,
}

impl ClauseBook {
    pub fn new(owning_contract: ContractId) -> Self {
        Self {
            owning_contract,
            criteria: Vec::new(),
            clauses: Vec::new(),
        }
    }

    pub fn owning_contract(&self) -> ContractId {
        self.owning_contract
    }

    /// Add an unsatisfied criterion. Returns its index.
    pub fn add_criterion(&mut self, description: impl Into<String>) -> usize {
        self.criteria.push(ContractCriteria {
            description: description.into(),
            satisfied: false,
        });
        self.criteria.len() - 1
    }

    /// Add an untriggered breaching clause. Returns its index.
    pub fn add_breaching_clause(
        &mut self,
        description: impl Into<String>,
        liable_party: Party,
    ) -> usize {
        self.clauses.push(BreachingClause {
            description: description.into(),
            liable_party,
            triggered: false,
        });
        self.clauses.len() - 1
    }

    /// Mark a criterion satisfied.
    pub fn satisfy(&mut self, index: usize) -> Result<(), ClauseError> {
        let criterion = self
            .criteria
            .get_mut(index)
            .ok_or(ClauseError::UnknownCriterion(index))?;
        criterion.satisfied = true;
        Ok(())
    }

    /// Mark a breaching clause triggered.
    pub fn trigger(&mut self, index: usize) -> Result<(), ClauseError> {
        let clause = self
            .clauses
            .get_mut(index)
            .ok_or(ClauseError::UnknownClause(index))?;
        clause.triggered = true;
        Ok(())
    }

    pub fn criteria(&self) -> &[ContractCriteria] {
        &self.criteria
    }

    pub fn breaching_clauses(&self) -> &[BreachingClause] {
        &self.clauses
    }

    /// True when there is at least one criterion and all are satisfied.
    pub fn all_satisfied(&self) -> bool {
        !self.criteria.is_empty() && self.criteria.iter().all(|c| c.satisfied)
    }

    /// The first triggered breaching clause.
    pub fn first_triggered(&self) -> Option<&BreachingClause> {
        self.clauses.iter().find(|c| c.triggered)
    }
}

impl<V: SignerValidity> ContractSystem<V> {
    /// Apply a clause book to a signed contract.
    ///
    /// # Errors
    ///
    /// `WrongContract` if the book belongs elsewhere, and
    /// `Transition(CannotTransitionFrom)` if the contract is not `Signed`.
    pub fn evaluate_clauses(
        &self,
        contract: &mut Contract,
        book: &ClauseBook,
    ) -> Result<ClauseOutcome, ClauseError> {
        if book.owning_contract != contract.id() {
            tracing::warn!(
                expected = %book.owning_contract,
                found = %contract.id(),
                "clause book evaluated against the wrong contract"
            );
            return Err(ClauseError::WrongContract {
                expected: book.owning_contract,
                found: contract.id(),
            });
        }
        if contract.state() != ContractState::Signed {
            return Err(TransitionError::CannotTransitionFrom(contract.state()).into());
        }

        if let Some(clause) = book.first_triggered() {
            tracing::debug!(
                contract = %contract.id(),
                clause = %clause.description,
                party = %clause.liable_party,
                "breaching clause triggered"
            );
            self.try_breach_contract(contract, clause.liable_party)?;
            return Ok(ClauseOutcome::Breached(clause.liable_party));
        }
        if book.all_satisfied() {
            self.try_close_out_contract(contract)?;
            return Ok(ClauseOutcome::ClosedOut);
        }
        Ok(ClauseOutcome::Pending)
    }
}
