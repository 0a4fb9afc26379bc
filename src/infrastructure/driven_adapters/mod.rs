//! Driven Adapters
//!
//! Implementations of gateway traits for external systems:
//! - Token repositories (KV and D1)
//! - KV store client
//! - Configuration

pub mod config;
pub mod database;
pub mod kv_store;
pub mod token_repository;

pub use config::{AppConfig, StorageMode};
pub use token_repository::{D1TokenRepository, KvTokenRepository};
