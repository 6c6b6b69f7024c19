//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`. Every field has a default, so
//! an empty file (or no file) is valid.
//!
//! ```yaml
//! policy:
//!   sign_on: unsigned_only
//! log_format: json
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use pact_core::PactError;
use pact_state::ContractPolicy;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Top-level `pact` configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PactConfig {
    /// Policy handed to every `ContractSystem` the CLI builds.
    pub policy: ContractPolicy,
    pub log_format: LogFormat,
}

impl PactConfig {
    /// Load from a YAML file.
    pub fn load(path: &Path) -> Result<Self, PactError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse from YAML text. Blank text yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, PactError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
