//! Common test utilities for e2e tests
//!
//! Builds the full router over either an in-memory SQLite token table or an
//! in-memory KV namespace pair, with helpers to seed data and issue requests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::util::ServiceExt;

use token_registry::application::TokenQueryResolver;
use token_registry::domain::gateways::TokenRepository;
use token_registry::infrastructure::driven_adapters::config::{AppConfig, RegistryConfig, ServerConfig, StorageMode};
use token_registry::infrastructure::driven_adapters::kv_store::{KeyList, KeyListOptions, KvStore};
use token_registry::infrastructure::driven_adapters::token_repository::{D1TokenRepository, KvTokenRepository};
use token_registry::infrastructure::driving_adapters::api_rest::{build_router, AppState};
use token_registry::shared::errors::RepositoryError;

const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp `days` from now, in the format stored in the tokens table
pub fn days_from_now(days: i64) -> String {
    (Utc::now() + Duration::days(days)).format(SQLITE_DATETIME_FORMAT).to_string()
}

/// Open a fresh in-memory database with the token schema loaded
pub async fn memory_pool() -> SqlitePool {
    // A single long-lived connection keeps the in-memory database alive
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::raw_sql(include_str!("../../sql/schema.sql"))
        .execute(&pool)
        .await
        .expect("Failed to load schema");

    pool
}

/// One row of the tokens table
#[derive(Debug, Clone)]
pub struct TokenSeed {
    pub network: String,
    pub testnet: bool,
    pub address: String,
    pub ticker: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<i64>,
    pub alt_counting: Option<bool>,
    pub categories: Option<String>,
    pub logos: Option<String>,
    pub enabled: bool,
    pub expiration: Option<String>,
    pub upcoming: Option<String>,
}

impl TokenSeed {
    pub fn new(network: &str, address: &str, ticker: &str) -> Self {
        Self {
            network: network.to_string(),
            testnet: false,
            address: address.to_string(),
            ticker: Some(ticker.to_string()),
            name: Some(format!("{ticker} Token")),
            decimals: Some(18),
            alt_counting: None,
            categories: Some("[]".to_string()),
            logos: None,
            enabled: true,
            expiration: None,
            upcoming: None,
        }
    }

    pub fn testnet(mut self) -> Self {
        self.testnet = true;
        self
    }

    pub fn categories(mut self, categories: &str) -> Self {
        self.categories = Some(categories.to_string());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn expired(mut self) -> Self {
        self.expiration = Some(days_from_now(-1));
        self
    }

    pub fn upcoming(mut self) -> Self {
        self.upcoming = Some(days_from_now(1));
        self
    }

    pub async fn insert(&self, pool: &SqlitePool) {
        sqlx::query(
            "INSERT INTO tokens (blockchain, network, chain_id, testnet, address, ticker, name, decimals, \
             alt_counting, categories, logos, enabled, expiration, upcoming) \
             VALUES ('coreblockchain', ?, 1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&self.network)
        .bind(self.testnet)
        .bind(&self.address)
        .bind(&self.ticker)
        .bind(&self.name)
        .bind(self.decimals)
        .bind(self.alt_counting)
        .bind(&self.categories)
        .bind(&self.logos)
        .bind(self.enabled)
        .bind(&self.expiration)
        .bind(&self.upcoming)
        .execute(pool)
        .await
        .expect("Failed to seed token");
    }
}

/// KV namespace held in memory; keys are listed in lexicographic order and the
/// cursor is the index of the next key
#[derive(Default)]
pub struct InMemoryKvStore {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl InMemoryKvStore {
    pub fn put(&self, key: &str, value: Value) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get_json(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn list_keys(&self, options: &KeyListOptions) -> Result<KeyList, RepositoryError> {
        let entries = self.entries.lock().unwrap();
        let matching: Vec<&String> = entries.keys().filter(|k| k.starts_with(&options.prefix)).collect();
        let start = options
            .cursor
            .as_deref()
            .and_then(|c| c.parse::<usize>().ok())
            .unwrap_or(0);
        let end = (start + options.limit as usize).min(matching.len());
        let keys = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|k| (*k).clone())
            .collect();
        let list_complete = end >= matching.len();

        Ok(KeyList {
            keys,
            list_complete,
            cursor: (!list_complete).then(|| end.to_string()),
        })
    }
}

/// Response captured from a oneshot request
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("Response body is not UTF-8")
    }
}

/// Test application context
pub struct TestApp {
    pub router: Router,
    pub pool: Option<SqlitePool>,
    pub mainnet: Arc<InMemoryKvStore>,
    pub testnet: Arc<InMemoryKvStore>,
}

fn test_config(storage: StorageMode, testnet_override: bool) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        registry: RegistryConfig {
            storage,
            testnet: testnet_override,
            environment: "production".to_string(),
        },
        database: None,
        kv: None,
    }
}

fn router(config: AppConfig, repository: Arc<dyn TokenRepository>) -> Router {
    let resolver = Arc::new(TokenQueryResolver::new(repository, config.registry.testnet));
    build_router(AppState {
        config: Arc::new(config),
        resolver,
    })
}

impl TestApp {
    /// Application served by the relational backend
    pub async fn d1() -> Self {
        Self::d1_with_override(false).await
    }

    pub async fn d1_with_override(testnet_override: bool) -> Self {
        let pool = memory_pool().await;
        let repository = Arc::new(D1TokenRepository::new(pool.clone()));

        Self {
            router: router(test_config(StorageMode::D1, testnet_override), repository),
            pool: Some(pool),
            mainnet: Arc::default(),
            testnet: Arc::default(),
        }
    }

    /// Application served by the KV backend
    pub fn kv() -> Self {
        let mainnet = Arc::new(InMemoryKvStore::default());
        let testnet = Arc::new(InMemoryKvStore::default());
        let repository = Arc::new(KvTokenRepository::new(mainnet.clone(), testnet.clone()));

        Self {
            router: router(test_config(StorageMode::Kv, false), repository),
            pool: None,
            mainnet,
            testnet,
        }
    }

    pub async fn seed(&self, tokens: &[TokenSeed]) {
        let pool = self.pool.as_ref().expect("Seeding requires the relational backend");
        for token in tokens {
            token.insert(pool).await;
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse { status, headers, body }
    }
}
