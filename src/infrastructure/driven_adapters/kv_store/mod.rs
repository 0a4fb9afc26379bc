//! Key-Value Store
//!
//! A single KV namespace holding token blobs keyed by address.

mod cloudflare;

use async_trait::async_trait;
use serde_json::Value;

use crate::shared::errors::RepositoryError;

pub use cloudflare::CloudflareKvStore;

/// Options for a key enumeration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyListOptions {
    pub prefix: String,
    pub limit: u32,
    pub cursor: Option<String>,
}

/// One page of keys returned by the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyList {
    pub keys: Vec<String>,
    pub list_complete: bool,
    /// Continuation token issued by the store, opaque to callers
    pub cursor: Option<String>,
}

/// Read access to one KV namespace
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch and JSON-decode the value stored under `key`
    async fn get_json(&self, key: &str) -> Result<Option<Value>, RepositoryError>;

    /// Enumerate keys in lexicographic order
    async fn list_keys(&self, options: &KeyListOptions) -> Result<KeyList, RepositoryError>;
}
