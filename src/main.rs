//! Token Registry API - Main Entry Point

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use token_registry::application::TokenQueryResolver;
use token_registry::domain::gateways::TokenRepository;
use token_registry::infrastructure::driven_adapters::config::{AppConfig, StorageMode};
use token_registry::infrastructure::driven_adapters::database::create_pool;
use token_registry::infrastructure::driven_adapters::kv_store::CloudflareKvStore;
use token_registry::infrastructure::driven_adapters::token_repository::{D1TokenRepository, KvTokenRepository};
use token_registry::infrastructure::driving_adapters::api_rest::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_registry=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    // Load configuration
    let config = AppConfig::load()?;
    tracing::info!(
        storage = ?config.registry.storage,
        testnet_override = config.registry.testnet,
        "Configuration loaded successfully"
    );

    // Create repository for the configured backend
    let token_repository = build_repository(&config).await?;
    let resolver = Arc::new(TokenQueryResolver::new(token_repository, config.registry.testnet));

    // Create application state
    let app_state = AppState {
        config: Arc::new(config.clone()),
        resolver,
    };

    let app = build_router(app_state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn TokenRepository>> {
    match config.registry.storage {
        StorageMode::D1 => {
            let database = config
                .database
                .as_ref()
                .context("[database] section is required when registry.storage = \"d1\"")?;
            let pool = create_pool(database).await?;
            tracing::info!("Database connection pool created");
            Ok(Arc::new(D1TokenRepository::new(pool)))
        }
        StorageMode::Kv => {
            let kv = config
                .kv
                .as_ref()
                .context("[kv] section is required when registry.storage = \"kv\"")?;
            let client = reqwest::Client::new();
            let mainnet = CloudflareKvStore::new(client.clone(), kv, &kv.mainnet_namespace_id)?;
            let testnet = CloudflareKvStore::new(client, kv, &kv.testnet_namespace_id)?;
            tracing::info!("KV namespaces configured");
            Ok(Arc::new(KvTokenRepository::new(Arc::new(mainnet), Arc::new(testnet))))
        }
    }
}
