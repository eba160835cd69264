//! Index configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for the vector store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding the per-conversation index files.
    pub index_dir: PathBuf,
    /// Vector dimensions; shorter embeddings are zero-padded and longer
    /// ones truncated on add.
    pub dimensions: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("./data/vector_indices"),
            dimensions: 384,
        }
    }
}

impl IndexConfig {
    /// Path of the vector table file for a conversation.
    pub fn vectors_path(&self, conversation_id: &str) -> PathBuf {
        self.index_dir.join(format!("{conversation_id}.vec"))
    }

    /// Path of the position→chunk-id map file for a conversation.
    pub fn map_path(&self, conversation_id: &str) -> PathBuf {
        self.index_dir.join(format!("{conversation_id}.map.json"))
    }

    /// Config rooted at a specific directory.
    pub fn at(dir: impl AsRef<Path>, dimensions: usize) -> Self {
        Self {
            index_dir: dir.as_ref().to_path_buf(),
            dimensions,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_use_conversation_id_as_stem() {
        let config = IndexConfig::at("/tmp/idx", 8);
        assert_eq!(
            config.vectors_path("conv_1"),
            PathBuf::from("/tmp/idx/conv_1.vec")
        );
        assert_eq!(
            config.map_path("conv_1"),
            PathBuf::from("/tmp/idx/conv_1.map.json")
        );
    }

    #[test]
    fn default_dimensions_match_embedding_default() {
        assert_eq!(IndexConfig::default().dimensions, 384);
    }
}
