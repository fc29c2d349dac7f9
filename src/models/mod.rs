// src/models/mod.rs
pub mod core;
pub mod matching;

pub use core::{CustomerId, CustomerRecord, FieldKind};
pub use matching::{
    Conflict, ConflictSeverity, FieldChange, MatchCandidate, MergeAction, MergeDecision,
};
