// src/config.rs
//! Matching configuration: field weights and decision thresholds.
//!
//! Loaded once at process start and passed by reference into the core.
//! Validation is fatal at construction; nothing downstream re-checks.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::ConfigError;
use crate::models::FieldKind;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.7;
pub const DEFAULT_SUGGESTION_FLOOR: f64 = 0.5;
// Jaro-Winkler floors near 0.4 even for unrelated strings, so the
// divergence cutoff sits well above the old sequence-ratio value.
pub const DEFAULT_NAME_DIVERGENCE_THRESHOLD: f64 = 0.55;
pub const DEFAULT_WARNING_PENALTY: f64 = 0.15;
pub const DEFAULT_AMBIGUITY_EPSILON: f64 = 0.02;

/// Relative weight of every recognized field. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldWeights {
    pub document: f64,
    pub email: f64,
    pub phone: f64,
    pub name: f64,
    pub address: f64,
    pub city: f64,
    pub state: f64,
    pub postal_code: f64,
    pub birth_date: f64,
    pub profession: f64,
}

impl FieldWeights {
    pub fn get(&self, kind: FieldKind) -> f64 {
        match kind {
            FieldKind::Document => self.document,
            FieldKind::Email => self.email,
            FieldKind::Phone => self.phone,
            FieldKind::Name => self.name,
            FieldKind::Address => self.address,
            FieldKind::City => self.city,
            FieldKind::State => self.state,
            FieldKind::PostalCode => self.postal_code,
            FieldKind::BirthDate => self.birth_date,
            FieldKind::Profession => self.profession,
        }
    }

    fn sum(&self) -> f64 {
        FieldKind::ALL.iter().map(|kind| self.get(*kind)).sum()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for kind in FieldKind::ALL {
            let weight = self.get(kind);
            if weight < 0.0 {
                return Err(ConfigError::NegativeWeight {
                    field: kind.as_str(),
                    value: weight,
                });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(())
    }
}

impl Default for FieldWeights {
    fn default() -> Self {
        FieldWeights {
            document: 0.40,
            email: 0.25,
            phone: 0.20,
            name: 0.05,
            address: 0.05,
            city: 0.0,
            state: 0.0,
            postal_code: 0.0,
            birth_date: 0.05,
            profession: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub weights: FieldWeights,
    /// Composite score at or above which an unblocked pair auto-merges.
    pub match_threshold: f64,
    /// Scores in [floor, threshold) are surfaced for human confirmation.
    pub suggestion_floor: f64,
    /// Name similarity below this raises a warning conflict.
    pub name_divergence_threshold: f64,
    /// Score reduction per warning conflict.
    pub warning_penalty: f64,
    /// Candidates within this of the top score are reported as ambiguous.
    pub ambiguity_epsilon: f64,
}

impl MatchingConfig {
    pub fn new(weights: FieldWeights, match_threshold: f64) -> Result<Self, ConfigError> {
        MatchingConfig {
            weights,
            match_threshold,
            suggestion_floor: DEFAULT_SUGGESTION_FLOOR,
            name_divergence_threshold: DEFAULT_NAME_DIVERGENCE_THRESHOLD,
            warning_penalty: DEFAULT_WARNING_PENALTY,
            ambiguity_epsilon: DEFAULT_AMBIGUITY_EPSILON,
        }
        .validated()
    }

    /// Validate and return the configuration, consuming self.
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.weights.validate()?;
        for (name, value) in [
            ("match_threshold", self.match_threshold),
            ("suggestion_floor", self.suggestion_floor),
            ("name_divergence_threshold", self.name_divergence_threshold),
        ] {
            if value <= 0.0 || value >= 1.0 {
                return Err(ConfigError::ThresholdRange { name, value });
            }
        }
        if self.suggestion_floor >= self.match_threshold {
            return Err(ConfigError::FloorAboveThreshold {
                floor: self.suggestion_floor,
                threshold: self.match_threshold,
            });
        }
        Ok(self)
    }

    /// Read overrides from environment variables, falling back to defaults.
    /// Unparseable values are ignored with a warning rather than guessed at.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = MatchingConfig::default();
        config.match_threshold =
            env_f64("CDP_MATCH_THRESHOLD").unwrap_or(config.match_threshold);
        config.suggestion_floor =
            env_f64("CDP_SUGGESTION_FLOOR").unwrap_or(config.suggestion_floor);
        config.name_divergence_threshold = env_f64("CDP_NAME_DIVERGENCE_THRESHOLD")
            .unwrap_or(config.name_divergence_threshold);
        config.warning_penalty =
            env_f64("CDP_WARNING_PENALTY").unwrap_or(config.warning_penalty);

        debug!(
            "Matching config: threshold={}, floor={}, name_divergence={}, penalty={}",
            config.match_threshold,
            config.suggestion_floor,
            config.name_divergence_threshold,
            config.warning_penalty
        );
        config.validated()
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        MatchingConfig {
            weights: FieldWeights::default(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            suggestion_floor: DEFAULT_SUGGESTION_FLOOR,
            name_divergence_threshold: DEFAULT_NAME_DIVERGENCE_THRESHOLD,
            warning_penalty: DEFAULT_WARNING_PENALTY,
            ambiguity_epsilon: DEFAULT_AMBIGUITY_EPSILON,
        }
    }
}

fn env_f64(key: &str) -> Option<f64> {
    let raw = env::var(key).ok()?;
    match raw.parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable {}={:?}", key, raw);
            None
        }
    }
}
