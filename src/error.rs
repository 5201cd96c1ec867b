//! Error types for policy construction, registry and configuration
//!
//! Evaluation itself is infallible: every soft failure collapses into a deny.
//! These errors only surface from the authoring-side APIs (parsing, validation,
//! registry bookkeeping and engine configuration).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid policy '{policy_id}': {reason}")]
    InvalidPolicy { policy_id: String, reason: String },

    #[error("Policy already registered: {0}")]
    DuplicatePolicy(String),

    #[error("Policy not found: {0}")]
    PolicyNotFound(String),
}

impl PolicyError {
    pub(crate) fn invalid(policy_id: &str, reason: impl Into<String>) -> Self {
        PolicyError::InvalidPolicy {
            policy_id: policy_id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PolicyError>;
