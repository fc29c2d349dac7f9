// src/matching/conflicts.rs
//! Field-level disagreement rules. The detector only reports; score
//! penalties and merge-safety calls belong to the decision engine.

use crate::config::MatchingConfig;
use crate::models::{Conflict, ConflictSeverity, CustomerRecord, FieldKind};

use super::normalize::{normalize_document, normalize_phone};
use super::similarity::text_similarity;

/// Detect conflicts between two records, in canonical field order.
///
/// - document present on both sides and normalized-different: blocking,
///   regardless of how well everything else agrees.
/// - name similarity below the divergence threshold: warning.
/// - phone present on both sides and digits-different: warning requiring
///   explicit confirmation, never auto-blocking.
pub fn detect_conflicts(
    config: &MatchingConfig,
    a: &CustomerRecord,
    b: &CustomerRecord,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    if let (Some(doc_a), Some(doc_b)) = (a.field(FieldKind::Document), b.field(FieldKind::Document))
    {
        let norm_a = normalize_document(doc_a);
        let norm_b = normalize_document(doc_b);
        if !norm_a.is_empty() && !norm_b.is_empty() && norm_a != norm_b {
            conflicts.push(Conflict {
                field: FieldKind::Document,
                severity: ConflictSeverity::Blocking,
                value_a: norm_a,
                value_b: norm_b,
            });
        }
    }

    if let (Some(phone_a), Some(phone_b)) = (a.field(FieldKind::Phone), b.field(FieldKind::Phone)) {
        let norm_a = normalize_phone(phone_a);
        let norm_b = normalize_phone(phone_b);
        if !norm_a.is_empty() && !norm_b.is_empty() && norm_a != norm_b {
            conflicts.push(Conflict {
                field: FieldKind::Phone,
                severity: ConflictSeverity::Warning,
                value_a: norm_a,
                value_b: norm_b,
            });
        }
    }

    if let (Some(name_a), Some(name_b)) = (a.field(FieldKind::Name), b.field(FieldKind::Name)) {
        if text_similarity(name_a, name_b) < config.name_divergence_threshold {
            conflicts.push(Conflict {
                field: FieldKind::Name,
                severity: ConflictSeverity::Warning,
                value_a: name_a.to_string(),
                value_b: name_b.to_string(),
            });
        }
    }

    conflicts.sort_by_key(|c| c.field);
    conflicts
}

/// Aggregate penalty: one penalty unit per warning. Applied to the
/// composite score by the decision engine, not the detector.
pub fn warning_penalty(config: &MatchingConfig, conflicts: &[Conflict]) -> f64 {
    let warnings = conflicts
        .iter()
        .filter(|c| c.severity == ConflictSeverity::Warning)
        .count();
    config.warning_penalty * warnings as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(fields: &[(FieldKind, &str)]) -> CustomerRecord {
        let mut r = CustomerRecord::new("test");
        for (kind, value) in fields {
            r.set_field(*kind, Some(value.to_string()));
        }
        r
    }

    #[test]
    fn test_document_mismatch_is_blocking() {
        let config = MatchingConfig::default();
        let a = record_with(&[(FieldKind::Document, "123.456.789-01")]);
        let b = record_with(&[(FieldKind::Document, "987.654.321-00")]);
        let conflicts = detect_conflicts(&config, &a, &b);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].field, FieldKind::Document);
        assert!(conflicts[0].is_blocking());
    }

    #[test]
    fn test_document_absent_on_one_side_is_no_conflict() {
        let config = MatchingConfig::default();
        let a = record_with(&[(FieldKind::Document, "12345678901")]);
        let b = record_with(&[(FieldKind::Name, "João Silva")]);
        assert!(detect_conflicts(&config, &a, &b).is_empty());
    }

    #[test]
    fn test_phone_mismatch_is_warning_not_blocking() {
        let config = MatchingConfig::default();
        let a = record_with(&[(FieldKind::Phone, "(11) 98765-4321")]);
        let b = record_with(&[(FieldKind::Phone, "(11) 91111-2222")]);
        let conflicts = detect_conflicts(&config, &a, &b);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].severity, ConflictSeverity::Warning);
    }

    #[test]
    fn test_diverging_names_warn() {
        let config = MatchingConfig::default();
        let a = record_with(&[(FieldKind::Name, "João Silva")]);
        let b = record_with(&[(FieldKind::Name, "Zyx Qwerty")]);
        let conflicts = detect_conflicts(&config, &a, &b);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].field, FieldKind::Name);
        assert_eq!(conflicts[0].severity, ConflictSeverity::Warning);

        // Similar names stay quiet.
        let c = record_with(&[(FieldKind::Name, "Joao da Silva")]);
        assert!(detect_conflicts(&config, &a, &c).is_empty());
    }

    #[test]
    fn test_conflicts_follow_canonical_order() {
        let config = MatchingConfig::default();
        let a = record_with(&[
            (FieldKind::Document, "12345678901"),
            (FieldKind::Phone, "11911112222"),
            (FieldKind::Name, "João Silva"),
        ]);
        let b = record_with(&[
            (FieldKind::Document, "98765432100"),
            (FieldKind::Phone, "11933334444"),
            (FieldKind::Name, "Zyx Qwerty"),
        ]);
        let conflicts = detect_conflicts(&config, &a, &b);
        let fields: Vec<FieldKind> = conflicts.iter().map(|c| c.field).collect();
        assert_eq!(fields, vec![FieldKind::Document, FieldKind::Phone, FieldKind::Name]);
    }

    #[test]
    fn test_penalty_scales_with_warning_count() {
        let config = MatchingConfig::default();
        let warning = |field| Conflict {
            field,
            severity: ConflictSeverity::Warning,
            value_a: "a".into(),
            value_b: "b".into(),
        };
        let blocking = Conflict {
            field: FieldKind::Document,
            severity: ConflictSeverity::Blocking,
            value_a: "a".into(),
            value_b: "b".into(),
        };

        assert_eq!(warning_penalty(&config, &[]), 0.0);
        // Blocking conflicts decide merge safety; they do not also penalize.
        assert_eq!(warning_penalty(&config, &[blocking]), 0.0);
        assert!(
            (warning_penalty(&config, &[warning(FieldKind::Phone)]) - config.warning_penalty)
                .abs()
                < 1e-12
        );
        let two = [warning(FieldKind::Phone), warning(FieldKind::Name)];
        assert!((warning_penalty(&config, &two) - 2.0 * config.warning_penalty).abs() < 1e-12);
    }
}
