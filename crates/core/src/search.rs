//! Free-text matching policy for catalog search.
//!
//! Matching is plain substring containment, case-insensitive, with no
//! tokenization or ranking. A blank term matches everything.

/// Returns `true` if `term` occurs in any of `fields`, ignoring case.
pub fn matches_term<'a>(term: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}
