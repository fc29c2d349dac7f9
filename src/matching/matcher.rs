// src/matching/matcher.rs
//! Weighted composite scoring of record pairs.

use log::debug;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::similarity::field_similarity;
use crate::config::MatchingConfig;
use crate::models::{CustomerRecord, FieldKind, MatchCandidate};

/// Score one (incoming, existing) pair. Pure and deterministic: the weighted
/// sum of per-field similarities over fields present in both records, with
/// weights renormalized over that present subset. Fields absent on either
/// side contribute nothing and their weight is spread over the rest.
pub fn score_pair(
    config: &MatchingConfig,
    incoming: &CustomerRecord,
    existing: &CustomerRecord,
) -> MatchCandidate {
    let mut field_scores: BTreeMap<FieldKind, f64> = BTreeMap::new();
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for kind in FieldKind::ALL {
        let weight = config.weights.get(kind);
        let Some(similarity) = field_similarity(kind, incoming, existing) else {
            continue;
        };
        field_scores.insert(kind, similarity);
        if weight > 0.0 {
            weighted_sum += weight * similarity;
            weight_total += weight;
        }
    }

    let composite_score = if weight_total > 0.0 {
        (weighted_sum / weight_total).clamp(0.0, 1.0)
    } else {
        0.0
    };

    debug!(
        "Scored pair ({} vs {}): composite={:.4} over {} comparable fields",
        incoming.id,
        existing.id,
        composite_score,
        field_scores.len()
    );

    MatchCandidate {
        record: existing.clone(),
        field_scores,
        composite_score,
    }
}

/// Order candidates by score descending. Ties break on the most recently
/// updated record, then on the lowest id, so results are reproducible.
pub fn rank_candidates(candidates: &mut [MatchCandidate]) {
    candidates.sort_by(|a, b| {
        b.composite_score
            .partial_cmp(&a.composite_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.record.updated_at.cmp(&a.record.updated_at))
            .then_with(|| a.record.id.cmp(&b.record.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomerRecord;
    use chrono::{Duration, Utc};

    fn full_record() -> CustomerRecord {
        let mut r = CustomerRecord::new("test");
        r.set_field(FieldKind::Name, Some("João Silva".into()));
        r.set_field(FieldKind::Email, Some("joao@example.com".into()));
        r.set_field(FieldKind::Document, Some("123.456.789-01".into()));
        r.set_field(FieldKind::Phone, Some("(11) 98765-4321".into()));
        r.set_field(FieldKind::Address, Some("Rua das Flores, 123".into()));
        r.set_field(FieldKind::City, Some("São Paulo".into()));
        r.set_field(FieldKind::State, Some("SP".into()));
        r.set_field(FieldKind::PostalCode, Some("01310-100".into()));
        r.set_field(FieldKind::BirthDate, Some("1990-03-15".into()));
        r.set_field(FieldKind::Profession, Some("Engenheira".into()));
        r
    }

    #[test]
    fn test_score_is_reflexive_on_identical_data() {
        let config = MatchingConfig::default();
        let a = full_record();
        let mut b = a.clone();
        b.id = crate::models::CustomerId::new();
        let candidate = score_pair(&config, &a, &b);
        assert!((candidate.composite_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_symmetric() {
        let config = MatchingConfig::default();
        let a = full_record();
        let mut b = full_record();
        b.set_field(FieldKind::Name, Some("Joao da Silva".into()));
        b.set_field(FieldKind::Email, Some("joao.silva@example.com".into()));
        b.set_field(FieldKind::Phone, Some("11 91234-0000".into()));

        let ab = score_pair(&config, &a, &b).composite_score;
        let ba = score_pair(&config, &b, &a).composite_score;
        assert!((ab - ba).abs() < 1e-12, "{} != {}", ab, ba);
    }

    #[test]
    fn test_missing_fields_redistribute_weight() {
        let config = MatchingConfig::default();
        // Only email present on both sides and agreeing: the email weight is
        // the entire present subset, so the composite is 1.0, not 0.25.
        let mut a = CustomerRecord::new("test");
        a.set_field(FieldKind::Email, Some("ana@example.com".into()));
        let mut b = CustomerRecord::new("test");
        b.set_field(FieldKind::Email, Some("ana@example.com".into()));
        b.set_field(FieldKind::Phone, Some("11 98765-4321".into())); // absent on a

        let candidate = score_pair(&config, &a, &b);
        assert!((candidate.composite_score - 1.0).abs() < 1e-9);
        assert_eq!(candidate.field_scores.len(), 1);
    }

    #[test]
    fn test_no_comparable_fields_scores_zero() {
        let config = MatchingConfig::default();
        let mut a = CustomerRecord::new("test");
        a.set_field(FieldKind::Email, Some("ana@example.com".into()));
        let mut b = CustomerRecord::new("test");
        b.set_field(FieldKind::Phone, Some("11 98765-4321".into()));
        let candidate = score_pair(&config, &a, &b);
        assert_eq!(candidate.composite_score, 0.0);
        assert!(candidate.field_scores.is_empty());
    }

    #[test]
    fn test_rank_prefers_recent_update_on_ties() {
        let config = MatchingConfig::default();
        let incoming = full_record();

        let mut older = full_record();
        older.id = crate::models::CustomerId::new();
        older.updated_at = Utc::now() - Duration::days(30);
        let mut newer = full_record();
        newer.id = crate::models::CustomerId::new();
        newer.updated_at = Utc::now();

        let mut candidates = vec![
            score_pair(&config, &incoming, &older),
            score_pair(&config, &incoming, &newer),
        ];
        rank_candidates(&mut candidates);
        assert_eq!(candidates[0].record.id, newer.id);
    }
}
