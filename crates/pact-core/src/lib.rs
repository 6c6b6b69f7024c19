//! # pact-core — Foundational Types for Pact
//!
//! Defines the primitives every other `pact-*` crate builds on. It depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `ContractId` and `SignerId` are
//!    distinct types. A signer can never be passed where a contract is
//!    expected.
//!
//! 2. **UTC-only timestamps.** `Timestamp` is always UTC, truncated to
//!    seconds, rendered with a `Z` suffix.
//!
//! 3. **One top-level error.** `PactError` covers configuration, scenario
//!    loading, and I/O. State machine rejections have their own, narrower
//!    error types in `pact-state`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pact-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::PactError;
pub use identity::{ContractId, SignerId};
pub use temporal::Timestamp;
