//! Reference photos used for recognition.

use catalist_core::recognition::signature::{blob_to_embedding, hex_to_bits};
use catalist_core::recognition::Reference;
use catalist_core::error::CoreError;
use catalist_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `cat_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatImage {
    pub id: DbId,
    pub cat_id: DbId,
    pub file_path: String,
    pub hash_hex: String,
    pub hash_bits: i64,
    /// Little-endian `f32` embedding; never sent to clients.
    #[serde(skip)]
    pub embedding: Vec<u8>,
    pub created_at: Timestamp,
}

impl CatImage {
    /// Decode the stored signature into a matcher reference.
    pub fn to_reference(&self) -> Result<Reference, CoreError> {
        let bits = hex_to_bits(&self.hash_hex, usize::try_from(self.hash_bits).ok())?;
        Ok(Reference {
            cat_id: self.cat_id,
            image_id: Some(self.id),
            bits,
            embedding: blob_to_embedding(&self.embedding, None),
        })
    }
}

/// DTO for storing a new reference image of a known cat.
pub struct CreateCatImage {
    pub file_path: String,
    pub hash_hex: String,
    pub hash_bits: i64,
    pub embedding: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalist_core::recognition::signature::embedding_to_blob;

    #[test]
    fn stored_signature_decodes_to_reference() {
        let image = CatImage {
            id: 7,
            cat_id: 3,
            file_path: "cats/3/a.png".into(),
            hash_hex: "a180".into(),
            hash_bits: 9,
            embedding: embedding_to_blob(&[0.6, 0.8]),
            created_at: chrono::Utc::now(),
        };
        let reference = image.to_reference().unwrap();
        assert_eq!(reference.cat_id, 3);
        assert_eq!(reference.image_id, Some(7));
        assert_eq!(reference.bits.len(), 9);
        assert_eq!(reference.embedding, vec![0.6, 0.8]);
    }

    #[test]
    fn embedding_is_not_serialized() {
        let image = CatImage {
            id: 1,
            cat_id: 1,
            file_path: "p".into(),
            hash_hex: "ff".into(),
            hash_bits: 8,
            embedding: vec![1, 2, 3, 4],
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&image).unwrap();
        assert!(json.get("embedding").is_none());
        assert_eq!(json["hash_hex"], "ff");
    }
}
