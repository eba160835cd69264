//! # braid-chunker
//!
//! Splits an ordered conversation into bounded, overlapping chunks.
//!
//! - [`ChunkerConfig`]: token/message caps and overlap width
//! - [`chunk_messages`]: the chunking pass itself
//!
//! Chunks are derived state: the mutation pipeline rebuilds them from the
//! full message set on every conversation change.
//!
//! ## Crate Position
//!
//! Depends on braid-core. Depended on by braid-runtime.

#![deny(unsafe_code)]

pub mod chunker;
pub mod config;

pub use chunker::chunk_messages;
pub use config::ChunkerConfig;
