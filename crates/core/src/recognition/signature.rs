//! Image signatures: a normalised embedding plus a binary hash.
//!
//! The hash is derived from the (optionally truncated) embedding by
//! z-normalising it and keeping the sign of each dimension. Hashes are stored
//! as hex, packed most-significant-bit first with the final byte zero-padded.

use std::sync::Arc;

use crate::error::CoreError;
use crate::recognition::features::{ColorLayoutExtractor, FeatureExtractor};

/// Sentinel distance returned when either hash is empty.
pub const EMPTY_HASH_DISTANCE: u32 = 9999;

/// Embedding and hash of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    /// L2-normalised embedding (full length, never truncated).
    pub embedding: Vec<f32>,
    /// Hex encoding of [`Signature::bits`].
    pub hash_hex: String,
    pub bits: Vec<bool>,
}

/// Computes signatures for raw image bytes.
///
/// Cheap to clone; the extractor is shared.
#[derive(Clone)]
pub struct CatRecognizer {
    extractor: Arc<dyn FeatureExtractor>,
    /// When non-zero and shorter than the embedding, only this many leading
    /// dimensions contribute to the hash. Zero means no override.
    hash_bits: Option<usize>,
}

impl Default for CatRecognizer {
    fn default() -> Self {
        Self::new(Arc::new(ColorLayoutExtractor), None)
    }
}

impl CatRecognizer {
    pub fn new(extractor: Arc<dyn FeatureExtractor>, hash_bits: Option<usize>) -> Self {
        Self {
            extractor,
            hash_bits,
        }
    }

    /// Dimensionality of the embeddings this recognizer produces.
    pub fn embedding_dim(&self) -> usize {
        self.extractor.dimension()
    }

    /// Decode `image_bytes` (PNG, JPEG or WebP) and compute its signature.
    pub fn compute_signature(&self, image_bytes: &[u8]) -> Result<Signature, CoreError> {
        let image = image::load_from_memory(image_bytes)
            .map_err(|e| CoreError::Validation(format!("Unable to decode image: {e}")))?;

        let embedding = l2_normalize(self.extractor.extract(&image));

        let truncated = match self.hash_bits {
            Some(n) if n > 0 && n < embedding.len() => &embedding[..n],
            _ => &embedding[..],
        };
        let bits = hash_bits_from(truncated);
        let hash_hex = bits_to_hex(&bits);

        Ok(Signature {
            embedding,
            hash_hex,
            bits,
        })
    }
}

/// Z-normalise a vector and keep the sign of each element.
fn hash_bits_from(values: &[f32]) -> Vec<bool> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    let std = variance.sqrt();
    values
        .iter()
        .map(|v| {
            let centred = v - mean;
            let normalized = if std > 0.0 { centred / std } else { centred };
            normalized >= 0.0
        })
        .collect()
}

/// Scale a vector to unit length. A zero vector is returned unchanged.
pub fn l2_normalize(mut values: Vec<f32>) -> Vec<f32> {
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        values.iter_mut().for_each(|v| *v /= norm);
    }
    values
}

/// Pack bits MSB-first into bytes and hex-encode them.
pub fn bits_to_hex(bits: &[bool]) -> String {
    bits.chunks(8)
        .map(|chunk| {
            let byte = chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, bit)| if *bit { acc | (0x80 >> i) } else { acc });
            format!("{byte:02x}")
        })
        .collect()
}

/// Unpack a stored hex hash. When `length` is given and shorter than the
/// unpacked bit count, the padding is dropped.
pub fn hex_to_bits(hex: &str, length: Option<usize>) -> Result<Vec<bool>, CoreError> {
    if hex.is_empty() {
        return Ok(Vec::new());
    }
    if hex.len() % 2 != 0 {
        return Err(CoreError::Validation(format!(
            "Hash hex must have an even length, got {}",
            hex.len()
        )));
    }
    let mut bits = Vec::with_capacity(hex.len() * 4);
    for i in (0..hex.len()).step_by(2) {
        let byte = hex
            .get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .ok_or_else(|| CoreError::Validation(format!("Invalid hash hex '{hex}'")))?;
        bits.extend((0..8).map(|shift| byte & (0x80 >> shift) != 0));
    }
    if let Some(len) = length {
        bits.truncate(len);
    }
    Ok(bits)
}

/// Mismatches over the common prefix plus the difference in length.
pub fn hamming_distance(a: &[bool], b: &[bool]) -> u32 {
    if a.is_empty() || b.is_empty() {
        return EMPTY_HASH_DISTANCE;
    }
    let mismatches = a.iter().zip(b).filter(|(x, y)| x != y).count();
    (mismatches + a.len().abs_diff(b.len())) as u32
}

/// Cosine similarity; `0.0` when either vector is empty or has zero norm.
///
/// Vectors of different lengths are compared over their common prefix.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let norm_a = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;
    if denom == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / denom
}

/// Unit-length centroid of a set of embeddings, or `None` when empty.
///
/// All embeddings are expected to share one length; extra trailing
/// dimensions of longer vectors are ignored.
pub fn summarize_embeddings(embeddings: &[Vec<f32>]) -> Option<Vec<f32>> {
    let dim = embeddings.iter().map(Vec::len).min()?;
    let count = embeddings.len() as f32;
    let centroid: Vec<f32> = (0..dim)
        .map(|i| embeddings.iter().map(|e| e[i]).sum::<f32>() / count)
        .collect();
    Some(l2_normalize(centroid))
}

/// Majority-vote consensus hash, hex-encoded, or `None` when empty.
///
/// Shorter hashes are zero-padded to the longest. A bit is set when at least
/// half of the hashes set it.
pub fn aggregate_hashes(hashes: &[Vec<bool>]) -> Option<String> {
    if hashes.is_empty() {
        return None;
    }
    let max_len = hashes.iter().map(Vec::len).max().unwrap_or(0);
    let half = hashes.len() as f32 / 2.0;
    let consensus: Vec<bool> = (0..max_len)
        .map(|i| {
            let votes = hashes
                .iter()
                .filter(|h| h.get(i).copied().unwrap_or(false))
                .count();
            votes as f32 >= half
        })
        .collect();
    Some(bits_to_hex(&consensus))
}

/// Serialise an embedding as little-endian `f32` bytes.
pub fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Inverse of [`embedding_to_blob`]. Trailing bytes that do not form a full
/// `f32` are ignored; `length` truncates when shorter.
pub fn blob_to_embedding(blob: &[u8], length: Option<usize>) -> Vec<f32> {
    let mut values: Vec<f32> = blob
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    if let Some(len) = length {
        values.truncate(len);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(img: RgbImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .expect("png encoding should succeed");
        buf.into_inner()
    }

    fn gradient(seed: u8) -> Vec<u8> {
        let img = RgbImage::from_fn(40, 40, |x, y| {
            Rgb([
                (x as u8).wrapping_mul(6).wrapping_add(seed),
                (y as u8).wrapping_mul(6),
                seed.wrapping_mul(3),
            ])
        });
        png_bytes(img)
    }

    // -- bits / hex ----------------------------------------------------------

    #[test]
    fn bits_pack_msb_first_with_padding() {
        assert_eq!(bits_to_hex(&[true]), "80");
        assert_eq!(
            bits_to_hex(&[true, false, true, false, false, false, false, true, true]),
            "a180"
        );
        assert_eq!(bits_to_hex(&[]), "");
    }

    #[test]
    fn hex_unpacks_and_truncates() {
        let bits = hex_to_bits("a180", Some(9)).unwrap();
        assert_eq!(
            bits,
            vec![true, false, true, false, false, false, false, true, true]
        );
        assert_eq!(hex_to_bits("ff", None).unwrap().len(), 8);
        assert_eq!(hex_to_bits("ff", Some(32)).unwrap().len(), 8);
        assert!(hex_to_bits("", None).unwrap().is_empty());
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert_matches!(hex_to_bits("abc", None), Err(CoreError::Validation(_)));
        assert_matches!(hex_to_bits("zz", None), Err(CoreError::Validation(_)));
    }

    // -- distances -----------------------------------------------------------

    #[test]
    fn hamming_counts_mismatches_and_length_gap() {
        assert_eq!(hamming_distance(&[true, false], &[true, true]), 1);
        assert_eq!(hamming_distance(&[true, false, true], &[true, false]), 1);
        assert_eq!(hamming_distance(&[], &[true]), EMPTY_HASH_DISTANCE);
        assert_eq!(hamming_distance(&[false], &[]), EMPTY_HASH_DISTANCE);
    }

    #[test]
    fn cosine_edge_cases() {
        assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    // -- aggregation ---------------------------------------------------------

    #[test]
    fn centroid_is_unit_length() {
        let c = summarize_embeddings(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert!((c[0] - expected).abs() < 1e-6);
        assert!((c[1] - expected).abs() < 1e-6);
        assert!(summarize_embeddings(&[]).is_none());
    }

    #[test]
    fn majority_vote_pads_short_hashes() {
        let hashes = vec![
            vec![true, true, false],
            vec![true, false, false],
            vec![false, false],
        ];
        // Votes: [2, 1, 0] of 3 -> threshold 1.5 -> [1, 0, 0] -> 0x80.
        assert_eq!(aggregate_hashes(&hashes).unwrap(), "80");
        // A tie (1 of 2) counts as set.
        assert_eq!(
            aggregate_hashes(&[vec![true], vec![false]]).unwrap(),
            "80"
        );
        assert!(aggregate_hashes(&[]).is_none());
    }

    #[test]
    fn blob_conversion_ignores_partial_values() {
        let embedding = vec![0.5_f32, -1.25, 3.0];
        let mut blob = embedding_to_blob(&embedding);
        assert_eq!(blob.len(), 12);
        blob.push(0xAB);
        assert_eq!(blob_to_embedding(&blob, None), embedding);
        assert_eq!(blob_to_embedding(&blob, Some(2)), vec![0.5, -1.25]);
        assert!(blob_to_embedding(&[], None).is_empty());
    }

    // -- signatures ----------------------------------------------------------

    #[test]
    fn identical_images_share_a_signature() {
        let recognizer = CatRecognizer::default();
        let a = recognizer.compute_signature(&gradient(10)).unwrap();
        let b = recognizer.compute_signature(&gradient(10)).unwrap();
        assert_eq!(a, b);
        assert!((cosine_similarity(&a.embedding, &b.embedding) - 1.0).abs() < 1e-5);
        assert_eq!(hamming_distance(&a.bits, &b.bits), 0);
    }

    #[test]
    fn signature_shape_follows_configuration() {
        let full = CatRecognizer::default()
            .compute_signature(&gradient(40))
            .unwrap();
        assert_eq!(full.embedding.len(), 216);
        assert_eq!(full.bits.len(), 216);
        assert_eq!(full.hash_hex.len(), 216 / 4);
        assert_eq!(hex_to_bits(&full.hash_hex, Some(216)).unwrap(), full.bits);

        let norm: f32 = full.embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);

        let short = CatRecognizer::new(Arc::new(ColorLayoutExtractor), Some(64))
            .compute_signature(&gradient(40))
            .unwrap();
        assert_eq!(short.bits.len(), 64);
        assert_eq!(short.embedding.len(), 216);
    }

    #[test]
    fn zero_hash_override_hashes_full_embedding() {
        let zero = CatRecognizer::new(Arc::new(ColorLayoutExtractor), Some(0))
            .compute_signature(&gradient(40))
            .unwrap();
        assert_eq!(zero.bits.len(), 216);
        assert_eq!(hamming_distance(&zero.bits, &zero.bits), 0);

        let full = CatRecognizer::default()
            .compute_signature(&gradient(40))
            .unwrap();
        assert_eq!(zero, full);
    }

    #[test]
    fn undecodable_bytes_are_a_validation_error() {
        let result = CatRecognizer::default().compute_signature(b"definitely not an image");
        assert_matches!(result, Err(CoreError::Validation(_)));
    }
}
