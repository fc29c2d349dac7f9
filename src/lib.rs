// src/lib.rs
//! Matching and audience-overlap core of a customer data platform.
//!
//! The crate covers fuzzy deduplication (field-weighted similarity,
//! conflict detection, merge-safety decisions) and set-overlap analysis
//! between audiences. Persistence, CSV mechanics and the UI are external
//! collaborators: they hand the core plain records and receive plain
//! decisions back.

pub mod audience;
pub mod config;
pub mod error;
pub mod matching;
pub mod models;

pub use audience::{analyze_overlap, Audience, OverlapResult};
pub use config::{FieldWeights, MatchingConfig};
pub use error::{ConfigError, MatchError};
pub use matching::{CandidateStore, InMemoryStore, MatchEngine};
pub use models::{
    Conflict, ConflictSeverity, CustomerId, CustomerRecord, FieldChange, FieldKind, MatchCandidate,
    MergeAction, MergeDecision,
};
