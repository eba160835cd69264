//! Provider response decoding.
//!
//! The inference API does not commit to one response shape: depending on
//! model and pipeline it returns a flat vector, a batch of one vector, or
//! an object wrapping either. Decoding tries a fixed priority order and
//! reports anything else as [`DecodedEmbedding::Unrecognized`] — no
//! guessing at arbitrary object keys.

use serde_json::Value;

/// Outcome of decoding one provider response body.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedEmbedding {
    /// A vector was found under one of the known shapes.
    Vector(Vec<f32>),
    /// The body parsed as JSON but matched no known shape.
    Unrecognized,
}

impl DecodedEmbedding {
    /// The vector, or empty when the shape was unrecognized.
    pub fn into_vec(self) -> Vec<f32> {
        match self {
            Self::Vector(v) => v,
            Self::Unrecognized => Vec::new(),
        }
    }
}

/// Decode a provider response body.
///
/// Priority order:
/// 1. flat number list: `[0.1, 0.2, ...]`
/// 2. batch of one: `[[0.1, 0.2, ...]]` (first row)
/// 3. object key `embeddings`: `{"embeddings": [[...]]}` (first row)
/// 4. object key `embedding`: `{"embedding": [...]}`
pub fn decode_embedding(body: &Value) -> DecodedEmbedding {
    match body {
        Value::Array(items) => decode_array(items),
        Value::Object(map) => {
            if let Some(Value::Array(rows)) = map.get("embeddings") {
                if let Some(Value::Array(first)) = rows.first() {
                    if let Some(v) = numbers(first) {
                        return DecodedEmbedding::Vector(v);
                    }
                }
            }
            if let Some(Value::Array(flat)) = map.get("embedding") {
                if let Some(v) = numbers(flat) {
                    return DecodedEmbedding::Vector(v);
                }
            }
            DecodedEmbedding::Unrecognized
        }
        _ => DecodedEmbedding::Unrecognized,
    }
}

fn decode_array(items: &[Value]) -> DecodedEmbedding {
    if items.is_empty() {
        return DecodedEmbedding::Unrecognized;
    }
    if let Some(v) = numbers(items) {
        return DecodedEmbedding::Vector(v);
    }
    if let Value::Array(first) = &items[0] {
        if let Some(v) = numbers(first) {
            return DecodedEmbedding::Vector(v);
        }
    }
    DecodedEmbedding::Unrecognized
}

/// Parse a slice of JSON values as an all-numbers vector.
fn numbers(items: &[Value]) -> Option<Vec<f32>> {
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_list() {
        let decoded = decode_embedding(&json!([0.1, 0.2, 0.3]));
        assert_eq!(decoded, DecodedEmbedding::Vector(vec![0.1, 0.2, 0.3]));
    }

    #[test]
    fn batch_of_one() {
        let decoded = decode_embedding(&json!([[0.5, -0.5]]));
        assert_eq!(decoded, DecodedEmbedding::Vector(vec![0.5, -0.5]));
    }

    #[test]
    fn embeddings_key() {
        let decoded = decode_embedding(&json!({"embeddings": [[1.0, 2.0]]}));
        assert_eq!(decoded, DecodedEmbedding::Vector(vec![1.0, 2.0]));
    }

    #[test]
    fn embedding_key() {
        let decoded = decode_embedding(&json!({"embedding": [1.0, 2.0, 3.0]}));
        assert_eq!(decoded, DecodedEmbedding::Vector(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn flat_list_wins_over_nested_interpretation() {
        // A flat list is not misread as a batch
        let decoded = decode_embedding(&json!([1, 2, 3]));
        assert_eq!(decoded, DecodedEmbedding::Vector(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn unknown_object_key_is_unrecognized() {
        // Unlike key probing, an unexpected wrapper key is not accepted
        let decoded = decode_embedding(&json!({"vectors": [[1.0, 2.0]]}));
        assert_eq!(decoded, DecodedEmbedding::Unrecognized);
    }

    #[test]
    fn mixed_types_are_unrecognized() {
        let decoded = decode_embedding(&json!([0.1, "oops", 0.3]));
        assert_eq!(decoded, DecodedEmbedding::Unrecognized);
    }

    #[test]
    fn empty_array_is_unrecognized() {
        assert_eq!(decode_embedding(&json!([])), DecodedEmbedding::Unrecognized);
    }

    #[test]
    fn scalar_is_unrecognized() {
        assert_eq!(
            decode_embedding(&json!("error: model loading")),
            DecodedEmbedding::Unrecognized
        );
        assert_eq!(decode_embedding(&json!(42)), DecodedEmbedding::Unrecognized);
    }

    #[test]
    fn into_vec_on_unrecognized_is_empty() {
        assert!(DecodedEmbedding::Unrecognized.into_vec().is_empty());
    }
}
