//! # braid-cache
//!
//! TTL key-value cache for computed context, summaries, and drafts.
//!
//! - [`CacheStore`]: the backend trait (get/set/delete/exists/prefix-delete)
//! - [`MemoryStore`]: in-process moka-backed store with per-entry TTL
//! - [`Cache`]: the defensive front every component talks to
//!
//! The front never propagates a backend failure: a broken store makes the
//! system uncached, not unavailable. Keys are namespaced per conversation
//! (`conversation:{id}:...`) so a mutation can invalidate everything a
//! conversation has cached in one call.
//!
//! ## Crate Position
//!
//! Standalone (no braid crate dependencies).
//! Depended on by: braid-context, braid-runtime, braid-server.

#![deny(unsafe_code)]

pub mod cache;
pub mod errors;
pub mod keys;
pub mod memory;
pub mod store;

pub use cache::Cache;
pub use errors::{CacheError, Result};
pub use memory::MemoryStore;
pub use store::CacheStore;
