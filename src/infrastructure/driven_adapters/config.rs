//! Application Configuration
//!
//! Loads configuration from files and environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Storage backend serving every request of this deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Kv,
    D1,
}

/// Registry behaviour configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub storage: StorageMode,
    /// Treat every request as testnet regardless of its network code
    #[serde(default)]
    pub testnet: bool,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_environment() -> String {
    "development".to_string()
}

/// Relational store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Cloudflare KV configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KvConfig {
    #[serde(default = "default_kv_api_base_url")]
    pub api_base_url: String,
    pub account_id: String,
    pub api_token: String,
    pub mainnet_namespace_id: String,
    pub testnet_namespace_id: String,
}

fn default_kv_api_base_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub registry: RegistryConfig,
    /// Required when `registry.storage = "d1"`
    pub database: Option<DatabaseConfig>,
    /// Required when `registry.storage = "kv"`
    pub kv: Option<KvConfig>,
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "default".into());

        Config::builder()
            // Start with default config
            .add_source(File::with_name("config/default").required(true))
            // Merge environment-specific config if it exists
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Override with environment variables (e.g., APP__REGISTRY__STORAGE)
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Whether the version endpoint should report a production build
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.registry.environment == "production"
    }
}
