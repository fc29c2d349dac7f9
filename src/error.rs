// src/error.rs
//! Error taxonomy for the matching core.
//!
//! Configuration problems are fatal at startup; per-call problems are
//! recoverable by the caller. Ambiguous matches are not errors, they are
//! reported on the decision itself.

use thiserror::Error;

/// Fatal configuration errors, raised when a [`crate::config::MatchingConfig`]
/// is constructed with invalid values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("field weights must sum to 1.0 (got {sum:.7})")]
    WeightSum { sum: f64 },

    #[error("{name} must be within (0, 1) (got {value})")]
    ThresholdRange { name: &'static str, value: f64 },

    #[error("suggestion floor ({floor}) must be below the match threshold ({threshold})")]
    FloorAboveThreshold { floor: f64, threshold: f64 },

    #[error("weight for {field} is negative ({value})")]
    NegativeWeight { field: &'static str, value: f64 },
}

/// Per-call errors signaling caller misuse. Never silently coerced into a
/// default decision.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("record has no comparable fields; at least one data field is required")]
    EmptyRecord,

    #[error("candidate store lookup failed")]
    Store(#[from] anyhow::Error),
}
