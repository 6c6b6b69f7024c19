//! # pact-state — Bilateral Contract State Machine
//!
//! Tracks agreements between two parties through
//! `Unsigned → Signed → (Breached | ClosedOut)`.
//!
//! ## Modules
//!
//! - **Contract** (`contract.rs`): the contract aggregate, `Party`, and the
//!   tagged `ContractState` enum.
//!
//! - **System** (`system.rs`): `ContractSystem`, the only thing that mutates
//!   a contract. Sign-on, the three transitions, and structured rejections.
//!
//! - **Observer** (`observer.rs`): `ContractStateChanged` and the observer
//!   trait notified after every accepted transition.
//!
//! - **Signer** (`signer.rs`): the signer-validity collaborator and a
//!   `DashMap`-backed signer registry.
//!
//! - **Policy** (`policy.rs`): host-configurable sign-on gating.
//!
//! - **Clause** (`clause.rs`): fulfilment criteria and breaching clauses,
//!   evaluated into close-out or breach.
//!
//! - **Registry** (`registry.rs`): per-contract exclusive access for
//!   multi-threaded hosts.
//!
//! ## Example
//!
//! ```
//! use pact_state::{Contract, ContractPolicy, ContractState, ContractSystem, Party, SignerRegistry};
//!
//! let signers = SignerRegistry::new();
//! let system = ContractSystem::new(signers.clone(), ContractPolicy::default());
//!
//! let mut contract = Contract::new();
//! assert!(system.sign_on(&mut contract, signers.register(), Party::PartyA));
//! assert!(system.sign_on(&mut contract, signers.register(), Party::PartyB));
//! system.try_sign_contract(&mut contract).unwrap();
//! system.try_breach_contract(&mut contract, Party::PartyB).unwrap();
//!
//! assert_eq!(contract.state(), ContractState::Breached { breaching_party: Party::PartyB });
//! assert!(system.try_close_out_contract(&mut contract).is_err());
//! ```

pub mod clause;
pub mod contract;
pub mod observer;
pub mod policy;
pub mod registry;
pub mod signer;
pub mod system;

// ─── Contract re-exports ────────────────────────────────────────────

pub use contract::{Contract, ContractState, ContractTransitionRecord, Party};

// ─── System re-exports ──────────────────────────────────────────────

pub use system::{ContractSystem, SignOnError, TransitionError};

// ─── Observer re-exports ────────────────────────────────────────────

pub use observer::{ContractObserver, ContractStateChanged, JournalEntry, TransitionJournal};

// ─── Collaborator and policy re-exports ─────────────────────────────

pub use policy::{ContractPolicy, SignOnPolicy};
pub use signer::{SignerRegistry, SignerStatus, SignerValidity};

// ─── Clause and registry re-exports ─────────────────────────────────

pub use clause::{BreachingClause, ClauseBook, ClauseError, ClauseOutcome, ContractCriteria};
pub use registry::{ContractRegistry, RegistryError};
