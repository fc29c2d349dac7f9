// src/audience/overlap.rs
//! Set-overlap metrics between two audiences. Pure hash-set algebra,
//! O(|A| + |B|); the caller materializes the ID sets.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::CustomerId;

/// A named, materialized set of customer ids. The defining criteria live
/// with the audience tooling and are opaque here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audience {
    pub id: String,
    pub name: String,
    pub member_ids: HashSet<CustomerId>,
}

impl Audience {
    /// Duplicate-bearing input collapses silently into a set.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        members: impl IntoIterator<Item = CustomerId>,
    ) -> Self {
        Audience {
            id: id.into(),
            name: name.into(),
            member_ids: members.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapResult {
    pub audience_a_id: String,
    pub audience_b_id: String,
    pub intersection_ids: HashSet<CustomerId>,
    pub exclusive_a_ids: HashSet<CustomerId>,
    pub exclusive_b_ids: HashSet<CustomerId>,
    /// 100 × |A∩B| / |A∪B|.
    pub overlap_rate_percent: f64,
    /// |A∩B| / |A∪B|, 0 when both sets are empty.
    pub jaccard_index: f64,
}

/// Compute intersection, both exclusive sets, overlap rate and Jaccard
/// index for two audiences. Both empty yields all-zero metrics rather
/// than NaN.
pub fn analyze_overlap(a: &Audience, b: &Audience) -> OverlapResult {
    let intersection_ids: HashSet<CustomerId> =
        a.member_ids.intersection(&b.member_ids).copied().collect();
    let exclusive_a_ids: HashSet<CustomerId> =
        a.member_ids.difference(&b.member_ids).copied().collect();
    let exclusive_b_ids: HashSet<CustomerId> =
        b.member_ids.difference(&a.member_ids).copied().collect();

    let union_size = intersection_ids.len() + exclusive_a_ids.len() + exclusive_b_ids.len();
    let jaccard_index = if union_size == 0 {
        0.0
    } else {
        intersection_ids.len() as f64 / union_size as f64
    };

    OverlapResult {
        audience_a_id: a.id.clone(),
        audience_b_id: b.id.clone(),
        intersection_ids,
        exclusive_a_ids,
        exclusive_b_ids,
        overlap_rate_percent: jaccard_index * 100.0,
        jaccard_index,
    }
}
