//! # pact-cli — Pact Command-Line Interface
//!
//! Drives the contract state machine from YAML scenario files so designers
//! can check contract flows without booting the game host.
//!
//! ## Subcommands
//!
//! - `run` — Replay a scenario and report each step's outcome
//! - `graph` — Print the contract transition graph
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from scenario execution.
//! - All state changes go through `pact_state::ContractSystem`.

pub mod config;
pub mod graph;
pub mod run;
pub mod scenario;
