// src/matching/mod.rs
//! The record-matching pipeline: candidate retrieval, weighted scoring,
//! conflict detection and the merge decision.

pub mod candidates;
pub mod conflicts;
pub mod decision;
pub mod matcher;
pub mod merge;
pub mod normalize;
pub mod similarity;

use log::debug;

use crate::config::MatchingConfig;
use crate::error::MatchError;
use crate::models::{CustomerRecord, MatchCandidate, MergeDecision};

pub use candidates::{find_candidates, CandidateQuery, CandidateStore, InMemoryStore};
pub use conflicts::detect_conflicts;
pub use decision::decide;
pub use matcher::{rank_candidates, score_pair};
pub use merge::merge_records;

/// Default bound on candidates scored per incoming record.
pub const DEFAULT_CANDIDATE_LIMIT: usize = 50;

/// Caller-owned matching core holding the immutable configuration. Stateless
/// beyond the config: every invocation works purely on its inputs, so
/// callers may run rows in parallel as long as merges to the same target
/// are serialized on their side.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    config: MatchingConfig,
    candidate_limit: usize,
}

impl MatchEngine {
    pub fn new(config: MatchingConfig) -> Self {
        MatchEngine {
            config,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
        }
    }

    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit;
        self
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Score one pair. Fails fast when either record carries no data at all;
    /// that is caller misuse, not a low-similarity pair.
    pub fn score_pair(
        &self,
        incoming: &CustomerRecord,
        existing: &CustomerRecord,
    ) -> Result<MatchCandidate, MatchError> {
        if incoming.is_empty() || existing.is_empty() {
            return Err(MatchError::EmptyRecord);
        }
        Ok(matcher::score_pair(&self.config, incoming, existing))
    }

    /// Run the full pipeline for one incoming record: find candidates in the
    /// store, score and rank them, detect conflicts against the best one and
    /// return the merge decision.
    pub fn match_record(
        &self,
        incoming: &CustomerRecord,
        store: &dyn CandidateStore,
        allow_manual_override: bool,
    ) -> Result<MergeDecision, MatchError> {
        if incoming.is_empty() {
            return Err(MatchError::EmptyRecord);
        }

        let retrieved = find_candidates(incoming, store, self.candidate_limit)?;
        if retrieved.is_empty() {
            debug!("No candidates for record {}; creating new", incoming.id);
            return Ok(MergeDecision::create_new());
        }

        let mut scored: Vec<MatchCandidate> = retrieved
            .iter()
            .map(|existing| matcher::score_pair(&self.config, incoming, existing))
            .collect();
        rank_candidates(&mut scored);

        Ok(decide(&self.config, incoming, &scored, allow_manual_override))
    }
}
