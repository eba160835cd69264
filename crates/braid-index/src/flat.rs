//! Brute-force flat index over fixed-dimension vectors.
//!
//! Vectors live in one contiguous row-major `Vec<f32>` alongside a parallel
//! chunk-id list (position i holds the chunk id of row i). Search is an
//! exact scan: conversations hold at most a few hundred chunks, so a scan
//! beats any approximate structure here.

use bytemuck::pod_collect_to_vec;

use crate::errors::{IndexError, Result};

const MAGIC: &[u8; 4] = b"BRVX";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

/// An exact L2 index over vectors of one fixed dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatIndex {
    dimensions: usize,
    /// Row-major vector table, `len = count * dimensions`.
    vectors: Vec<f32>,
    /// Chunk id per row.
    chunk_ids: Vec<i64>,
}

impl FlatIndex {
    /// Create an empty index for the given dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: Vec::new(),
            chunk_ids: Vec::new(),
        }
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.chunk_ids.len()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.chunk_ids.is_empty()
    }

    /// Vector dimensions.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Chunk id stored at a row position.
    pub fn chunk_id_at(&self, position: usize) -> Option<i64> {
        self.chunk_ids.get(position).copied()
    }

    /// Append a vector for `chunk_id`, repairing its dimension first.
    ///
    /// Embeddings shorter than the index dimension are zero-padded and
    /// longer ones truncated — a lenient policy so a provider model swap
    /// degrades ranking quality instead of dropping chunks. Returns the row
    /// position.
    pub fn push(&mut self, mut embedding: Vec<f32>, chunk_id: i64) -> usize {
        if embedding.len() != self.dimensions {
            tracing::warn!(
                expected = self.dimensions,
                got = embedding.len(),
                chunk_id,
                "embedding dimension mismatch, repairing"
            );
            embedding.resize(self.dimensions, 0.0);
        }
        self.vectors.extend_from_slice(&embedding);
        self.chunk_ids.push(chunk_id);
        self.chunk_ids.len() - 1
    }

    /// Exact nearest-neighbor scan.
    ///
    /// Returns up to `top_k` `(chunk_id, squared L2 distance)` pairs, best
    /// (smallest distance) first. `top_k` is clamped to the index size; an
    /// empty index returns an empty list.
    pub fn scan(&self, query: &[f32], top_k: usize) -> Vec<(i64, f32)> {
        if self.is_empty() || query.is_empty() || top_k == 0 {
            return Vec::new();
        }
        let top_k = top_k.min(self.len());

        let mut scored: Vec<(i64, f32)> = self
            .vectors
            .chunks_exact(self.dimensions)
            .zip(&self.chunk_ids)
            .map(|(row, &chunk_id)| (chunk_id, squared_l2(query, row)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(top_k);
        scored
    }

    /// Serialize to the on-disk format.
    ///
    /// Layout: `BRVX` magic, format version, dimensions, row count (all
    /// u32 LE), then the raw f32 table.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.vectors.len() * 4);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&(self.dimensions as u32).to_le_bytes());
        out.extend_from_slice(&(self.len() as u32).to_le_bytes());
        out.extend_from_slice(bytemuck::cast_slice(&self.vectors));
        out
    }

    /// Deserialize the vector table; chunk ids are stored separately and
    /// supplied by the caller.
    pub fn from_bytes(bytes: &[u8], chunk_ids: Vec<i64>) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(IndexError::Corrupt("short header".into()));
        }
        if &bytes[0..4] != MAGIC {
            return Err(IndexError::Corrupt("bad magic".into()));
        }
        let version = u32::from_le_bytes(bytes[4..8].try_into().expect("sliced"));
        if version != FORMAT_VERSION {
            return Err(IndexError::Corrupt(format!("unknown version {version}")));
        }
        let dimensions = u32::from_le_bytes(bytes[8..12].try_into().expect("sliced")) as usize;
        let count = u32::from_le_bytes(bytes[12..16].try_into().expect("sliced")) as usize;

        let body = &bytes[HEADER_LEN..];
        if dimensions == 0 || body.len() != count * dimensions * 4 {
            return Err(IndexError::Corrupt(format!(
                "size mismatch: {count} rows x {dimensions} dims vs {} body bytes",
                body.len()
            )));
        }
        if chunk_ids.len() != count {
            return Err(IndexError::Corrupt(format!(
                "id map holds {} entries for {count} rows",
                chunk_ids.len()
            )));
        }

        Ok(Self {
            dimensions,
            vectors: pod_collect_to_vec(body),
            chunk_ids,
        })
    }

    /// The chunk-id map, position-ordered.
    pub fn chunk_ids(&self) -> &[i64] {
        &self.chunk_ids
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    // Query vectors are dimension-repaired before the scan; zip guards the
    // impossible mismatch anyway.
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
