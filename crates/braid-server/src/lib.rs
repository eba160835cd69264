//! # braid-server
//!
//! The thin HTTP surface over the braid pipeline.
//!
//! - [`config::AppConfig`]: environment-derived configuration
//! - [`state::AppState`]: explicitly constructed, dependency-injected
//!   services (no global singletons)
//! - [`routes::router`]: the axum route table
//! - [`llm_http::HttpLlmClient`]: OpenAI-style chat-completions client for
//!   the prose collaborator
//!
//! ## Crate Position
//!
//! Top of the dependency graph; every braid crate feeds into it.

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod llm_http;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use routes::router;
pub use state::AppState;
