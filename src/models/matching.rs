// src/models/matching.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::core::{CustomerId, CustomerRecord, FieldKind};

/// A scored pairing of the incoming record against one existing record.
/// Ephemeral: computed per matching invocation, never persisted.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub record: CustomerRecord,
    pub field_scores: BTreeMap<FieldKind, f64>,
    pub composite_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    Blocking,
    Warning,
    Tolerated,
}

/// A field-level disagreement between two records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub field: FieldKind,
    pub severity: ConflictSeverity,
    pub value_a: String,
    pub value_b: String,
}

impl Conflict {
    pub fn is_blocking(&self) -> bool {
        self.severity == ConflictSeverity::Blocking
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeAction {
    AutoMerge,
    SuggestMerge,
    Reject,
    CreateNew,
}

/// Outcome of one matching invocation, returned to the import/add flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeDecision {
    pub action: MergeAction,
    pub composite_score: f64,
    /// Conflicts against the top candidate, in canonical field order.
    pub conflicts: Vec<Conflict>,
    pub target_record_id: Option<CustomerId>,
    /// Candidates tying with the top score within the ambiguity epsilon.
    /// Non-empty means a human should pick rather than trust the top pick.
    pub ambiguous_with: Vec<CustomerId>,
}

impl MergeDecision {
    pub fn create_new() -> Self {
        MergeDecision {
            action: MergeAction::CreateNew,
            composite_score: 0.0,
            conflicts: Vec::new(),
            target_record_id: None,
            ambiguous_with: Vec::new(),
        }
    }
}

/// One field-level change applied during a merge, kept as audit history
/// by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: FieldKind,
    pub old_value: Option<String>,
    pub new_value: String,
    pub source: String,
    pub changed_at: DateTime<Utc>,
}
