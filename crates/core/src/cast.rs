//! Cast list normalization.
//!
//! A movie's cast links are keyed by `(movie_id, actor_id)`, so an actor can
//! appear at most once. Callers may still submit duplicates (a form posted
//! twice, a client that appends blindly); those collapse to the first
//! occurrence.

use std::collections::HashSet;

use crate::types::DbId;

/// Remove duplicate actor ids, keeping the first occurrence of each.
pub fn distinct_actor_ids(actor_ids: &[DbId]) -> Vec<DbId> {
    let mut seen = HashSet::with_capacity(actor_ids.len());
    actor_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}
