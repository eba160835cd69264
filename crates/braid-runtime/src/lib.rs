//! # braid-runtime
//!
//! The write path: message ingestion and the derived-state rebuild that
//! follows every conversation mutation.
//!
//! - [`MutationPipeline`]: delete chunks -> rechunk -> persist -> embed ->
//!   index -> invalidate cache, serialized per conversation
//! - [`IngestService`]: message append (single or bulk) that triggers the
//!   pipeline
//!
//! ## Crate Position
//!
//! Depends on braid-core, braid-chunker, braid-cache, braid-embeddings,
//! braid-index, braid-store. Depended on by braid-server.

#![deny(unsafe_code)]

pub mod errors;
pub mod ingest;
pub mod pipeline;

pub use errors::{Result, RuntimeError};
pub use ingest::IngestService;
pub use pipeline::{MutationPipeline, RebuildOutcome};
