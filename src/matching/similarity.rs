// src/matching/similarity.rs
//! Per-field similarity primitives.
//!
//! Every function returns a score in [0, 1]. `field_similarity` returns
//! `None` when either side is absent, so the matcher can exclude the field
//! and redistribute its weight instead of silently scoring it 0 or 1.

use chrono::NaiveDate;
use strsim::jaro_winkler;

use super::normalize::{
    email_domain, normalize_document, normalize_email, normalize_phone, normalize_text, tokenize,
};
use crate::models::{CustomerRecord, FieldKind};

/// Credit for distinct mailboxes on the same domain.
const SAME_DOMAIN_CREDIT: f64 = 0.3;

const BIRTH_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Similarity of one field across two records. `None` means the field is
/// absent (or unusable, e.g. an unparseable date) on at least one side.
pub fn field_similarity(kind: FieldKind, a: &CustomerRecord, b: &CustomerRecord) -> Option<f64> {
    let value_a = a.field(kind)?;
    let value_b = b.field(kind)?;

    match kind {
        FieldKind::Document => exact_normalized(&normalize_document(value_a), &normalize_document(value_b)),
        FieldKind::Phone => exact_normalized(&normalize_phone(value_a), &normalize_phone(value_b)),
        FieldKind::State | FieldKind::PostalCode => {
            exact_normalized(&normalize_document(value_a), &normalize_document(value_b))
        }
        FieldKind::Email => email_similarity(value_a, value_b),
        FieldKind::Name | FieldKind::City | FieldKind::Profession => {
            Some(text_similarity(value_a, value_b))
        }
        FieldKind::Address => Some(token_overlap(value_a, value_b)),
        FieldKind::BirthDate => date_similarity(value_a, value_b),
    }
}

fn exact_normalized(a: &str, b: &str) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    Some(if a == b { 1.0 } else { 0.0 })
}

/// Jaro-Winkler over normalized text.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let norm_a = normalize_text(a);
    let norm_b = normalize_text(b);
    if norm_a.is_empty() || norm_b.is_empty() {
        return 0.0;
    }
    jaro_winkler(&norm_a, &norm_b)
}

/// Jaccard ratio over normalized tokens. Tolerant of reordered address
/// parts ("Rua A, 10" vs "10 Rua A").
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let set_a: std::collections::HashSet<&str> = tokens_a.iter().map(String::as_str).collect();
    let set_b: std::collections::HashSet<&str> = tokens_b.iter().map(String::as_str).collect();
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}

fn email_similarity(a: &str, b: &str) -> Option<f64> {
    let norm_a = normalize_email(a);
    let norm_b = normalize_email(b);
    if norm_a.is_empty() || norm_b.is_empty() {
        return None;
    }
    if norm_a == norm_b {
        return Some(1.0);
    }
    let same_domain = match (email_domain(&norm_a), email_domain(&norm_b)) {
        (Some(da), Some(db)) => da == db,
        _ => false,
    };
    Some(if same_domain { SAME_DOMAIN_CREDIT } else { 0.0 })
}

fn date_similarity(a: &str, b: &str) -> Option<f64> {
    let date_a = parse_birth_date(a)?;
    let date_b = parse_birth_date(b)?;
    Some(if date_a == date_b { 1.0 } else { 0.0 })
}

/// Accepts ISO and Brazilian day-first formats. `None` for anything else;
/// the field is then treated as missing, not as a mismatch.
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    BIRTH_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value.trim(), fmt).ok())
}

/// Whether two raw values mean the same thing after per-field
/// normalization. Used by the merge to keep formatting noise out of the
/// change history.
pub fn values_equivalent(kind: FieldKind, a: &str, b: &str) -> bool {
    match kind {
        FieldKind::Document | FieldKind::State | FieldKind::PostalCode => {
            normalize_document(a) == normalize_document(b)
        }
        FieldKind::Phone => normalize_phone(a) == normalize_phone(b),
        FieldKind::Email => normalize_email(a) == normalize_email(b),
        FieldKind::BirthDate => match (parse_birth_date(a), parse_birth_date(b)) {
            (Some(date_a), Some(date_b)) => date_a == date_b,
            _ => a.trim() == b.trim(),
        },
        FieldKind::Name | FieldKind::Address | FieldKind::City | FieldKind::Profession => {
            normalize_text(a) == normalize_text(b)
        }
    }
}
