//! # braid-store
//!
//! SQLite persistence for conversation state.
//!
//! - [`pool`]: connection pool + startup migration
//! - [`MessageRepo`]: append-only message rows
//! - [`ChunkRepo`]: disposable chunk rows, bulk-replaced per mutation
//! - [`SummaryRepo`]: append-only summary rows, newest wins
//!
//! Repositories are stateless — every method takes `&Connection` (or
//! `&mut` for transactional bulk writes), keeping pooling and transaction
//! scope at the call site.
//!
//! ## Crate Position
//!
//! Depends on braid-core. Depended on by braid-context, braid-runtime,
//! braid-server.

#![deny(unsafe_code)]

pub mod errors;
pub mod migrations;
pub mod pool;
pub mod repositories;

pub use errors::{Result, StoreError};
pub use migrations::run_migrations;
pub use pool::{DbPool, open_pool};
pub use repositories::chunk::ChunkRepo;
pub use repositories::message::MessageRepo;
pub use repositories::summary::SummaryRepo;
