// src/matching/candidates.rs
//! Candidate retrieval: cheap, indexable pre-filters that bound the set of
//! records worth scoring. Recall-oriented: a false positive costs one extra
//! score_pair call, a false negative loses a merge.

use anyhow::Result;
use log::debug;
use std::collections::{HashMap, HashSet};

use super::normalize::{normalize_document, normalize_email, phonetic_name_keys};
use crate::models::{CustomerId, CustomerRecord};

/// Normalized pre-filter values extracted from an incoming record. Empty
/// fields produce no predicate; a query with no predicates matches nothing.
#[derive(Debug, Clone, Default)]
pub struct CandidateQuery {
    pub document: Option<String>,
    pub email: Option<String>,
    pub name_keys: Vec<String>,
}

impl CandidateQuery {
    pub fn from_record(record: &CustomerRecord) -> Self {
        CandidateQuery {
            document: record
                .document_id
                .as_deref()
                .map(normalize_document)
                .filter(|d| !d.is_empty()),
            email: record
                .email
                .as_deref()
                .map(normalize_email)
                .filter(|e| !e.is_empty()),
            name_keys: record
                .name
                .as_deref()
                .map(phonetic_name_keys)
                .unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_none() && self.email.is_none() && self.name_keys.is_empty()
    }
}

/// The single I/O boundary of the core: one synchronous lookup per matching
/// invocation, implemented by the persistence collaborator. Predicates are
/// OR-combined; implementations may over-return but must not scan when no
/// predicate is set.
pub trait CandidateStore {
    fn lookup(&self, query: &CandidateQuery) -> Result<Vec<CustomerRecord>>;
}

/// Retrieve plausible duplicates for `record`, deduplicated by id in
/// first-seen order, truncated to `limit`. Records with no usable
/// pre-filter value never hit the store.
pub fn find_candidates(
    record: &CustomerRecord,
    store: &dyn CandidateStore,
    limit: usize,
) -> Result<Vec<CustomerRecord>> {
    let query = CandidateQuery::from_record(record);
    if query.is_empty() {
        debug!("No candidate predicates for record {}; skipping lookup", record.id);
        return Ok(Vec::new());
    }

    let raw = store.lookup(&query)?;
    let mut seen: HashSet<CustomerId> = HashSet::new();
    let mut candidates: Vec<CustomerRecord> = Vec::new();
    for candidate in raw {
        if candidates.len() >= limit {
            break;
        }
        if candidate.id == record.id {
            continue;
        }
        if seen.insert(candidate.id) {
            candidates.push(candidate);
        }
    }
    debug!(
        "Candidate lookup for {}: {} candidate(s) after dedup",
        record.id,
        candidates.len()
    );
    Ok(candidates)
}

/// Hash-indexed in-memory store, used by the batch CLI and as the reference
/// implementation of the lookup contract. Probes are O(1) per predicate.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: HashMap<CustomerId, CustomerRecord>,
    by_document: HashMap<String, Vec<CustomerId>>,
    by_email: HashMap<String, Vec<CustomerId>>,
    by_name_key: HashMap<String, Vec<CustomerId>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: CustomerId) -> Option<&CustomerRecord> {
        self.records.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomerRecord> {
        self.records.values()
    }

    /// Insert or replace a record, refreshing its index entries.
    pub fn upsert(&mut self, record: CustomerRecord) {
        if let Some(previous) = self.records.remove(&record.id) {
            self.unindex(&previous);
        }
        self.index(&record);
        self.records.insert(record.id, record);
    }

    pub fn remove(&mut self, id: CustomerId) -> Option<CustomerRecord> {
        let record = self.records.remove(&id)?;
        self.unindex(&record);
        Some(record)
    }

    fn index(&mut self, record: &CustomerRecord) {
        let query = CandidateQuery::from_record(record);
        if let Some(doc) = query.document {
            self.by_document.entry(doc).or_default().push(record.id);
        }
        if let Some(email) = query.email {
            self.by_email.entry(email).or_default().push(record.id);
        }
        for key in query.name_keys {
            self.by_name_key.entry(key).or_default().push(record.id);
        }
    }

    fn unindex(&mut self, record: &CustomerRecord) {
        let query = CandidateQuery::from_record(record);
        if let Some(doc) = query.document {
            prune(&mut self.by_document, &doc, record.id);
        }
        if let Some(email) = query.email {
            prune(&mut self.by_email, &email, record.id);
        }
        for key in query.name_keys {
            prune(&mut self.by_name_key, &key, record.id);
        }
    }
}

fn prune(index: &mut HashMap<String, Vec<CustomerId>>, key: &str, id: CustomerId) {
    if let Some(ids) = index.get_mut(key) {
        ids.retain(|existing| *existing != id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}

impl CandidateStore for InMemoryStore {
    fn lookup(&self, query: &CandidateQuery) -> Result<Vec<CustomerRecord>> {
        let mut ids: Vec<CustomerId> = Vec::new();
        if let Some(doc) = &query.document {
            if let Some(hits) = self.by_document.get(doc) {
                ids.extend(hits);
            }
        }
        if let Some(email) = &query.email {
            if let Some(hits) = self.by_email.get(email) {
                ids.extend(hits);
            }
        }
        for key in &query.name_keys {
            if let Some(hits) = self.by_name_key.get(key) {
                ids.extend(hits);
            }
        }
        Ok(ids
            .into_iter()
            .filter_map(|id| self.records.get(&id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldKind;

    fn record_with(fields: &[(FieldKind, &str)]) -> CustomerRecord {
        let mut r = CustomerRecord::new("test");
        for (kind, value) in fields {
            r.set_field(*kind, Some(value.to_string()));
        }
        r
    }

    #[test]
    fn test_empty_store_returns_no_candidates() {
        let store = InMemoryStore::new();
        let incoming = record_with(&[(FieldKind::Document, "12345678901")]);
        let candidates = find_candidates(&incoming, &store, 10).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_record_without_predicates_skips_lookup() {
        let mut store = InMemoryStore::new();
        store.upsert(record_with(&[(FieldKind::Document, "12345678901")]));
        let incoming = record_with(&[(FieldKind::City, "São Paulo")]);
        let candidates = find_candidates(&incoming, &store, 10).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_document_prefilter_ignores_formatting() {
        let mut store = InMemoryStore::new();
        let existing = record_with(&[(FieldKind::Document, "123.456.789-01")]);
        let existing_id = existing.id;
        store.upsert(existing);

        let incoming = record_with(&[(FieldKind::Document, "12345678901")]);
        let candidates = find_candidates(&incoming, &store, 10).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, existing_id);
    }

    #[test]
    fn test_phonetic_name_prefilter() {
        let mut store = InMemoryStore::new();
        let existing = record_with(&[(FieldKind::Name, "João Silva")]);
        let existing_id = existing.id;
        store.upsert(existing);

        let incoming = record_with(&[(FieldKind::Name, "Joao Sylva")]);
        let candidates = find_candidates(&incoming, &store, 10).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, existing_id);
    }

    #[test]
    fn test_or_combined_hits_dedup_by_id() {
        let mut store = InMemoryStore::new();
        // Same record reachable via document, email and name key.
        let existing = record_with(&[
            (FieldKind::Document, "12345678901"),
            (FieldKind::Email, "joao@example.com"),
            (FieldKind::Name, "João Silva"),
        ]);
        store.upsert(existing.clone());

        let incoming = record_with(&[
            (FieldKind::Document, "123.456.789-01"),
            (FieldKind::Email, "JOAO@example.com"),
            (FieldKind::Name, "Joao Silva"),
        ]);
        let candidates = find_candidates(&incoming, &store, 10).unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_limit_bounds_candidates() {
        let mut store = InMemoryStore::new();
        for _ in 0..5 {
            store.upsert(record_with(&[(FieldKind::Email, "shared@example.com")]));
        }
        let incoming = record_with(&[(FieldKind::Email, "shared@example.com")]);
        let candidates = find_candidates(&incoming, &store, 3).unwrap();
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn test_zero_limit_yields_no_candidates() {
        let mut store = InMemoryStore::new();
        store.upsert(record_with(&[(FieldKind::Email, "shared@example.com")]));
        let incoming = record_with(&[(FieldKind::Email, "shared@example.com")]);
        let candidates = find_candidates(&incoming, &store, 0).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_upsert_reindexes_changed_fields() {
        let mut store = InMemoryStore::new();
        let mut existing = record_with(&[(FieldKind::Email, "old@example.com")]);
        store.upsert(existing.clone());

        existing.set_field(FieldKind::Email, Some("new@example.com".to_string()));
        store.upsert(existing);

        let incoming_old = record_with(&[(FieldKind::Email, "old@example.com")]);
        assert!(find_candidates(&incoming_old, &store, 10).unwrap().is_empty());

        let incoming_new = record_with(&[(FieldKind::Email, "new@example.com")]);
        assert_eq!(find_candidates(&incoming_new, &store, 10).unwrap().len(), 1);
    }
}
