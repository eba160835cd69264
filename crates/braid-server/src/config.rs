//! Server configuration.
//!
//! Flags first, `BRAID_*` environment variables second, compiled defaults
//! last — clap's `env` feature collapses the three layers into one struct.

use std::net::SocketAddr;
use std::path::PathBuf;

use braid_chunker::ChunkerConfig;
use braid_context::ContextConfig;
use braid_embeddings::EmbeddingConfig;
use braid_index::IndexConfig;
use clap::Parser;

/// Process configuration.
#[derive(Clone, Debug, Parser)]
#[command(name = "braid", about = "Conversation context service")]
pub struct AppConfig {
    /// Listen address.
    #[arg(long, env = "BRAID_ADDR", default_value = "127.0.0.1:8080")]
    pub addr: SocketAddr,

    /// SQLite database path.
    #[arg(long, env = "BRAID_DB_PATH", default_value = "./data/braid.db")]
    pub db_path: PathBuf,

    /// Directory for per-conversation vector index files.
    #[arg(long, env = "BRAID_INDEX_DIR", default_value = "./data/vector_indices")]
    pub index_dir: PathBuf,

    /// Embedding provider endpoint base URL.
    #[arg(
        long,
        env = "BRAID_EMBEDDING_ENDPOINT",
        default_value = "https://api-inference.huggingface.co/models"
    )]
    pub embedding_endpoint: String,

    /// Embedding model identifier.
    #[arg(long, env = "BRAID_EMBEDDING_MODEL", default_value = "BAAI/bge-small-en-v1.5")]
    pub embedding_model: String,

    /// Embedding provider bearer token.
    #[arg(long, env = "BRAID_EMBEDDING_TOKEN")]
    pub embedding_token: Option<String>,

    /// Embedding vector dimensions.
    #[arg(long, env = "BRAID_EMBEDDING_DIMENSIONS", default_value_t = 384)]
    pub embedding_dimensions: usize,

    /// Chat-completions endpoint for summarization and drafting.
    #[arg(
        long,
        env = "BRAID_LLM_ENDPOINT",
        default_value = "https://api.openai.com/v1/chat/completions"
    )]
    pub llm_endpoint: String,

    /// Chat model identifier.
    #[arg(long, env = "BRAID_LLM_MODEL", default_value = "gpt-4o-mini")]
    pub llm_model: String,

    /// Chat provider API key.
    #[arg(long, env = "BRAID_LLM_API_KEY")]
    pub llm_api_key: Option<String>,

    /// Run with in-process mock embedding and LLM backends (no network).
    #[arg(long, env = "BRAID_OFFLINE", default_value_t = false)]
    pub offline: bool,

    /// Token cap per chunk.
    #[arg(long, env = "BRAID_MAX_CHUNK_TOKENS", default_value_t = 1000)]
    pub max_chunk_tokens: u32,

    /// Message-count cap per chunk.
    #[arg(long, env = "BRAID_MAX_CHUNK_MESSAGES", default_value_t = 50)]
    pub max_chunk_messages: u32,

    /// Chunk overlap width in messages.
    #[arg(long, env = "BRAID_OVERLAP_MESSAGES", default_value_t = 2)]
    pub overlap_messages: u32,

    /// Chunks considered per retrieval.
    #[arg(long, env = "BRAID_TOP_K", default_value_t = 5)]
    pub top_k: usize,

    /// Token budget of the packed context.
    #[arg(long, env = "BRAID_MAX_CONTEXT_TOKENS", default_value_t = 4000)]
    pub max_context_tokens: u32,

    /// Cache TTL in seconds.
    #[arg(long, env = "BRAID_CACHE_TTL_SECS", default_value_t = 3600)]
    pub cache_ttl_secs: u64,
}

impl AppConfig {
    /// Defaults without reading the process arguments (tests).
    pub fn for_tests() -> Self {
        Self::parse_from(["braid"])
    }

    /// Chunker knobs.
    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig {
            max_chunk_tokens: self.max_chunk_tokens,
            max_chunk_messages: self.max_chunk_messages,
            overlap_messages: self.overlap_messages,
        }
    }

    /// Context retrieval knobs.
    pub fn context_config(&self) -> ContextConfig {
        ContextConfig {
            top_k: self.top_k,
            max_tokens: self.max_context_tokens,
            cache_ttl_secs: self.cache_ttl_secs,
            ..ContextConfig::default()
        }
    }

    /// Embedding provider settings.
    pub fn embedding_config(&self) -> EmbeddingConfig {
        EmbeddingConfig {
            endpoint: self.embedding_endpoint.clone(),
            model: self.embedding_model.clone(),
            api_token: self.embedding_token.clone(),
            dimensions: self.embedding_dimensions,
            ..EmbeddingConfig::default()
        }
    }

    /// Vector index settings.
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig::at(&self.index_dir, self.embedding_dimensions)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
