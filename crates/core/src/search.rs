//! Catalog fuzzy search.
//!
//! The catalog is small enough to rank in memory: every whitespace-separated
//! term of the query must hit at least one searchable field, either as a
//! substring (strong) or as an in-order subsequence (weak). This lives in
//! `core` so repositories and handlers can share it without IO.

// ---------------------------------------------------------------------------
// Scoring constants
// ---------------------------------------------------------------------------

/// Score for a term found verbatim inside a field.
pub const SUBSTRING_SCORE: u32 = 3;

/// Score for a term whose characters appear in order inside a field.
pub const SUBSEQUENCE_SCORE: u32 = 1;

/// Multiplier applied when the matching field is the cat's name.
pub const NAME_WEIGHT: u32 = 2;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of cats per page.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Maximum number of cats per page.
pub const MAX_LIST_LIMIT: i64 = 200;

/// Clamp a requested page size into `1..=MAX_LIST_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

/// Clamp a requested offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Searchable records
// ---------------------------------------------------------------------------

/// A record that exposes text fields to the fuzzy matcher.
///
/// The first field returned by [`Searchable::name_field`] gets
/// [`NAME_WEIGHT`]; [`Searchable::other_fields`] are scored as-is.
pub trait Searchable {
    fn name_field(&self) -> &str;
    fn other_fields(&self) -> Vec<&str>;
}

/// Lowercase whitespace-separated terms of a query. Empty when blank.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}

/// Whether `needle` occurs in `haystack` as an in-order (not necessarily
/// contiguous) character sequence.
pub fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut hay = haystack.chars();
    needle.chars().all(|n| hay.any(|h| h == n))
}

/// Score one lowercased term against one lowercased field.
fn term_score(term: &str, field: &str) -> u32 {
    if field.contains(term) {
        SUBSTRING_SCORE
    } else if is_subsequence(term, field) {
        SUBSEQUENCE_SCORE
    } else {
        0
    }
}

/// Score a record against pre-split terms.
///
/// Returns `None` when any term fails to match every field, otherwise the
/// sum of each term's best field score. No terms scores `Some(0)`.
pub fn score<T: Searchable + ?Sized>(record: &T, terms: &[String]) -> Option<u32> {
    let name = record.name_field().to_lowercase();
    let others: Vec<String> = record
        .other_fields()
        .into_iter()
        .map(str::to_lowercase)
        .collect();

    let mut total = 0;
    for term in terms {
        let name_score = term_score(term, &name) * NAME_WEIGHT;
        let best = others
            .iter()
            .map(|field| term_score(term, field))
            .fold(name_score, u32::max);
        if best == 0 {
            return None;
        }
        total += best;
    }
    Some(total)
}

/// Filter and rank `records` against `query`.
///
/// Sorting is by descending score; `tie_key` breaks ties ascending (the
/// catalog passes the cat id). The input order is irrelevant.
pub fn rank<T, K, F>(records: Vec<T>, query: &str, tie_key: F) -> Vec<T>
where
    T: Searchable,
    K: Ord,
    F: Fn(&T) -> K,
{
    let terms = query_terms(query);
    let mut scored: Vec<(u32, T)> = records
        .into_iter()
        .filter_map(|r| score(&r, &terms).map(|s| (s, r)))
        .collect();
    scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| tie_key(a).cmp(&tie_key(b))));
    scored.into_iter().map(|(_, r)| r).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
