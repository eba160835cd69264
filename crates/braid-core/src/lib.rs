//! # braid-core
//!
//! Foundation types and utilities for the braid conversation service.
//!
//! This crate provides the shared vocabulary that all other braid crates
//! depend on:
//!
//! - **Records**: [`message::Message`], [`chunk::Chunk`], [`summary::Summary`]
//! - **IDs**: [`ids::new_conversation_id`] prefixed-uuid minting
//! - **Token sizing**: [`tokens::TokenCounter`] for budget math everywhere
//! - **Text**: [`text::truncate_str`] UTF-8-safe truncation
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other braid crates.

#![deny(unsafe_code)]

pub mod chunk;
pub mod ids;
pub mod message;
pub mod summary;
pub mod text;
pub mod tokens;

pub use chunk::{Chunk, ChunkDraft};
pub use message::{Message, NewMessage};
pub use summary::Summary;
pub use tokens::TokenCounter;
