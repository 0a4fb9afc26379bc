//! Token Registry API
//!
//! A read-only Rust microservice that resolves blockchain token metadata from
//! either a Cloudflare KV namespace pair or a relational (D1/SQLite) table,
//! following Clean/Hexagonal Architecture principles.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
