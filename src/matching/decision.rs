// src/matching/decision.rs
//! Merge decision engine: combines the ranked candidates and their conflict
//! reports into a single decision per incoming record.

use log::{debug, warn};

use super::conflicts::{detect_conflicts, warning_penalty};
use crate::config::MatchingConfig;
use crate::models::{
    Conflict, ConflictSeverity, CustomerId, CustomerRecord, FieldKind, MatchCandidate,
    MergeAction, MergeDecision,
};

/// Decide what to do with an incoming record given its candidates, which
/// must already be ranked best-first (see `rank_candidates`).
///
/// State machine, evaluated once per incoming record:
/// - no candidates: create_new.
/// - top candidate blocked: reject; suggest_merge instead only when the
///   penalized score clears the threshold and the caller allows manual
///   override.
/// - penalized score at or above the threshold, unblocked: auto_merge,
///   downgraded to suggest_merge when a phone warning demands explicit
///   confirmation.
/// - penalized score in [suggestion_floor, threshold): suggest_merge.
/// - otherwise: create_new.
pub fn decide(
    config: &MatchingConfig,
    incoming: &CustomerRecord,
    candidates: &[MatchCandidate],
    allow_manual_override: bool,
) -> MergeDecision {
    let Some(top) = candidates.first() else {
        return MergeDecision::create_new();
    };

    let conflicts = detect_conflicts(config, incoming, &top.record);
    let penalized = (top.composite_score - warning_penalty(config, &conflicts)).max(0.0);
    let ambiguous_with = ties_within_epsilon(config, candidates);
    if !ambiguous_with.is_empty() {
        warn!(
            "Ambiguous match for {}: {} candidate(s) within {:.3} of the top score {:.4}",
            incoming.id,
            ambiguous_with.len(),
            config.ambiguity_epsilon,
            top.composite_score
        );
    }

    let blocked = conflicts.iter().any(Conflict::is_blocking);
    let needs_confirmation = conflicts
        .iter()
        .any(|c| c.field == FieldKind::Phone && c.severity == ConflictSeverity::Warning);
    let action = if blocked {
        if penalized >= config.match_threshold && allow_manual_override {
            MergeAction::SuggestMerge
        } else {
            MergeAction::Reject
        }
    } else if penalized >= config.match_threshold {
        if needs_confirmation {
            MergeAction::SuggestMerge
        } else {
            MergeAction::AutoMerge
        }
    } else if penalized >= config.suggestion_floor {
        MergeAction::SuggestMerge
    } else {
        return MergeDecision {
            action: MergeAction::CreateNew,
            composite_score: penalized,
            conflicts,
            target_record_id: None,
            ambiguous_with,
        };
    };

    debug!(
        "Decision for {}: {:?} against {} (score {:.4}, {} conflict(s))",
        incoming.id,
        action,
        top.record.id,
        penalized,
        conflicts.len()
    );

    MergeDecision {
        action,
        composite_score: penalized,
        conflicts,
        target_record_id: Some(top.record.id),
        ambiguous_with,
    }
}

fn ties_within_epsilon(config: &MatchingConfig, candidates: &[MatchCandidate]) -> Vec<CustomerId> {
    let Some(top) = candidates.first() else {
        return Vec::new();
    };
    candidates
        .iter()
        .skip(1)
        .take_while(|c| top.composite_score - c.composite_score <= config.ambiguity_epsilon)
        .map(|c| c.record.id)
        .collect()
}
