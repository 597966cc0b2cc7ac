//! Ranking a query signature against stored reference images.

use serde::Serialize;

use crate::recognition::signature::{cosine_similarity, hamming_distance};
use crate::types::DbId;

/// Default number of matches returned.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Default cosine similarity at or above which a match counts as positive.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.75;

/// Upper bound on `max_results` accepted from clients.
pub const MAX_RESULTS_CAP: usize = 20;

/// One stored reference image, already decoded from the database.
#[derive(Debug, Clone)]
pub struct Reference {
    pub cat_id: DbId,
    pub image_id: Option<DbId>,
    pub bits: Vec<bool>,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    pub max_results: usize,
    pub similarity_threshold: f32,
    /// References whose hash is further than this are skipped outright.
    pub max_hamming: Option<u32>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_hamming: None,
        }
    }
}

/// Outcome of comparing the query against one reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionResult {
    pub cat_id: DbId,
    pub reference_image_id: Option<DbId>,
    pub similarity: f32,
    pub hamming_distance: u32,
    /// Bit length of the query hash.
    pub reference_hash_length: usize,
    pub matched: bool,
}

/// Score every reference and return the best `max_results`.
///
/// Ordering is by similarity descending, then hamming distance ascending.
pub fn match_against<'a, I>(
    query_bits: &[bool],
    query_embedding: &[f32],
    references: I,
    options: &MatchOptions,
) -> Vec<RecognitionResult>
where
    I: IntoIterator<Item = &'a Reference>,
{
    let hash_length = query_bits.len();

    let mut results: Vec<RecognitionResult> = references
        .into_iter()
        .filter_map(|reference| {
            let distance = hamming_distance(query_bits, &reference.bits);
            if options.max_hamming.is_some_and(|max| distance > max) {
                return None;
            }
            let similarity = cosine_similarity(query_embedding, &reference.embedding);
            Some(RecognitionResult {
                cat_id: reference.cat_id,
                reference_image_id: reference.image_id,
                similarity,
                hamming_distance: distance,
                reference_hash_length: hash_length,
                matched: similarity >= options.similarity_threshold,
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.hamming_distance.cmp(&b.hamming_distance))
    });
    results.truncate(options.max_results);
    results
}
