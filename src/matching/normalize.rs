// src/matching/normalize.rs
//! Field normalizers shared by the similarity primitives and the candidate
//! pre-filters. Normalization here is for comparison only; stored values are
//! never rewritten.

use once_cell::sync::Lazy;
use regex::Regex;
use rphonetic::{DoubleMetaphone, Encoder};
use unicode_normalization::UnicodeNormalization;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Lowercase, strip diacritics (NFD decomposition, combining marks dropped)
/// and collapse runs of whitespace. Used for names, addresses, cities and
/// professions; accents are common in Portuguese data and must not affect
/// comparison.
pub fn normalize_text(text: &str) -> String {
    let stripped: String = text
        .nfd()
        .filter(|c| c.is_ascii() || c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let lowered = stripped.to_lowercase();
    WHITESPACE_RE.replace_all(lowered.trim(), " ").into_owned()
}

/// Strip everything but alphanumerics and case-fold. CPF/CNPJ formatting
/// ("123.456.789-01") normalizes to the bare digit string.
pub fn normalize_document(doc: &str) -> String {
    doc.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Digits only. Phone comparison is binary, so no country-code heuristics
/// beyond stripping formatting.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Trim, lowercase, and drop a plus-tag from the local part. Returns an
/// empty string for values without a usable local@domain shape.
pub fn normalize_email(email: &str) -> String {
    let email_trimmed = email.trim().to_lowercase();
    let parts: Vec<&str> = email_trimmed.splitn(2, '@').collect();
    if parts.len() != 2 || parts[1].is_empty() {
        return String::new();
    }
    let (local_full, domain) = (parts[0], parts[1]);
    let local = local_full.split('+').next().unwrap_or("");
    if local.is_empty() {
        String::new()
    } else {
        format!("{}@{}", local, domain)
    }
}

/// Domain part of a normalized email, if any.
pub fn email_domain(normalized: &str) -> Option<&str> {
    normalized.splitn(2, '@').nth(1).filter(|d| !d.is_empty())
}

/// Double Metaphone codes for each name token, used as candidate-blocking
/// keys. Tokens shorter than 3 characters carry too little signal and are
/// skipped.
pub fn phonetic_name_keys(name: &str) -> Vec<String> {
    let normalized = normalize_text(name);
    let encoder = DoubleMetaphone::default();
    let mut keys: Vec<String> = Vec::new();
    for token in normalized.split_whitespace() {
        let ascii: String = token.chars().filter(|c| c.is_ascii_alphabetic()).collect();
        if ascii.len() < 3 {
            continue;
        }
        let code = encoder.encode(&ascii);
        if !code.is_empty() && !keys.contains(&code) {
            keys.push(code);
        }
    }
    keys
}

/// Normalized whitespace-separated tokens with punctuation stripped, for
/// token-overlap similarity.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize_text(text)
        .split_whitespace()
        .map(|token| token.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|token| !token.is_empty())
        .collect()
}
