// src/matching/merge.rs
//! Field-level record merge for accepted merges. The survivor keeps the
//! existing record's id; the caller persists the result and retires the
//! absorbed record under its own transaction.

use chrono::Utc;
use log::debug;

use super::similarity::values_equivalent;
use crate::models::{CustomerRecord, FieldChange, FieldKind};

/// Merge `incoming` into `existing`. Incoming non-empty values win and emit
/// a `FieldChange` when they differ; absent incoming values keep what the
/// existing record had. Values that only differ in formatting (case,
/// separators, accents) keep the existing spelling and produce no change.
/// `updated_at`, `change_count` and `sources` are refreshed on the
/// survivor; `confidence_score` stays with the caller, which applies
/// `max(existing, match_score)` after deciding.
pub fn merge_records(
    existing: &CustomerRecord,
    incoming: &CustomerRecord,
    source: &str,
) -> (CustomerRecord, Vec<FieldChange>) {
    let mut merged = existing.clone();
    let mut changes = Vec::new();
    let now = Utc::now();

    for kind in FieldKind::ALL {
        let Some(new_value) = incoming.field(kind) else {
            continue;
        };
        let old_value = existing.field(kind);
        let equivalent = old_value
            .map(|old| values_equivalent(kind, old, new_value))
            .unwrap_or(false);
        if !equivalent {
            changes.push(FieldChange {
                field: kind,
                old_value: old_value.map(str::to_string),
                new_value: new_value.to_string(),
                source: source.to_string(),
                changed_at: now,
            });
            merged.set_field(kind, Some(new_value.to_string()));
        }
    }

    merged.updated_at = now;
    merged.change_count += changes.len() as u32;
    if !merged.sources.iter().any(|s| s == source) {
        merged.sources.push(source.to_string());
    }

    debug!(
        "Merged {} into {}: {} field change(s)",
        incoming.id,
        existing.id,
        changes.len()
    );
    (merged, changes)
}
