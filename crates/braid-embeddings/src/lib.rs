//! # braid-embeddings
//!
//! Turns chunk text into fixed-dimension vectors via an external provider.
//!
//! - [`EmbeddingService`]: the async trait every backend implements
//! - [`HttpEmbeddingService`]: HuggingFace-style inference endpoint client
//! - [`MockEmbeddingService`]: deterministic hash-based vectors for tests
//! - [`decode`]: fixed-priority decode of the provider's variable response shapes
//!
//! Provider failures are absorbed here: a transport error, non-200 status,
//! or unrecognized body yields an *empty* vector ("no embedding"), never an
//! error that propagates into a request path.
//!
//! ## Crate Position
//!
//! Standalone (no braid crate dependencies).
//! Depended on by: braid-index, braid-runtime, braid-server.

#![deny(unsafe_code)]

pub mod config;
pub mod decode;
pub mod errors;
pub mod http_service;
pub mod normalize;
pub mod service;

pub use config::EmbeddingConfig;
pub use decode::DecodedEmbedding;
pub use errors::{EmbeddingError, Result};
pub use http_service::HttpEmbeddingService;
pub use normalize::{cosine_similarity, l2_norm, l2_normalize};
pub use service::{EmbeddingService, MockEmbeddingService};
