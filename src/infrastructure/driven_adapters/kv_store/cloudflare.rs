//! Cloudflare Workers KV Store
//!
//! Reads a KV namespace through the Cloudflare REST API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

use super::{KeyList, KeyListOptions, KvStore};
use crate::infrastructure::driven_adapters::config::KvConfig;
use crate::shared::errors::RepositoryError;

#[derive(Debug, Deserialize)]
struct ListKeysResponse {
    #[serde(default)]
    result: Vec<KeyEntry>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct KeyEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    cursor: Option<String>,
}

/// KV namespace backed by the Cloudflare API
pub struct CloudflareKvStore {
    client: Client,
    namespace_url: Url,
    api_token: String,
}

impl CloudflareKvStore {
    /// Create a store for one namespace of the configured account
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Mapping` if the configured base URL is invalid.
    pub fn new(client: Client, config: &KvConfig, namespace_id: &str) -> Result<Self, RepositoryError> {
        let mut namespace_url = Url::parse(&config.api_base_url)
            .map_err(|e| RepositoryError::Mapping(format!("Invalid KV api_base_url: {e}")))?;
        namespace_url
            .path_segments_mut()
            .map_err(|()| RepositoryError::Mapping("KV api_base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend([
                "accounts",
                config.account_id.as_str(),
                "storage",
                "kv",
                "namespaces",
                namespace_id,
            ]);

        Ok(Self {
            client,
            namespace_url,
            api_token: config.api_token.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.namespace_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }
}

#[async_trait]
impl KvStore for CloudflareKvStore {
    async fn get_json(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        let response = self
            .client
            .get(self.endpoint(&["values", key]))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key, error = %e, "KV value request failed");
                RepositoryError::Kv(e)
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            tracing::error!(key, status = status.as_u16(), "KV value request rejected");
            return Err(RepositoryError::KvApi {
                status: status.as_u16(),
                key: key.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| RepositoryError::Mapping(format!("Value for '{key}' is not valid JSON: {e}")))
    }

    async fn list_keys(&self, options: &KeyListOptions) -> Result<KeyList, RepositoryError> {
        let mut url = self.endpoint(&["keys"]);
        {
            let mut query = url.query_pairs_mut();
            if !options.prefix.is_empty() {
                query.append_pair("prefix", &options.prefix);
            }
            query.append_pair("limit", &options.limit.to_string());
            if let Some(cursor) = options.cursor.as_deref().filter(|c| !c.is_empty()) {
                query.append_pair("cursor", cursor);
            }
        }

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(prefix = %options.prefix, error = %e, "KV list request failed");
                RepositoryError::Kv(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(prefix = %options.prefix, status = status.as_u16(), "KV list request rejected");
            return Err(RepositoryError::KvApi {
                status: status.as_u16(),
                key: format!("{}*", options.prefix),
            });
        }

        let body: ListKeysResponse = response.json().await?;
        let cursor = body.result_info.and_then(|info| info.cursor).filter(|c| !c.is_empty());

        Ok(KeyList {
            keys: body.result.into_iter().map(|entry| entry.name).collect(),
            list_complete: cursor.is_none(),
            cursor,
        })
    }
}
