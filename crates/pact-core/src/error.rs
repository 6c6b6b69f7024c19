//! # Error Types
//!
//! Top-level error for the Pact workspace. All errors use `thiserror`.
//!
//! State machine rejections (`TransitionError`, `SignOnError`) live in
//! `pact-state`: they are expected outcomes of normal play, not faults, and
//! callers match on them directly.

use thiserror::Error;

/// Top-level error type for Pact.
#[derive(Error, Debug)]
pub enum PactError {
    /// A configuration document was malformed or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// YAML deserialization error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
