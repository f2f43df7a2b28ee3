//! Standalone server backed by the in-memory store
//!
//! Configuration comes from the YAML file named by the first argument or by
//! `TENANTRY_CONFIG`, then `TENANTRY_*` environment overrides.

use anyhow::Result;
use tenantry::config::ApiConfig;
use tenantry::server::ServerBuilder;
use tenantry::storage::InMemoryStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TENANTRY_CONFIG").ok());
    let config = match config_path {
        Some(path) => {
            tracing::info!(%path, "loading configuration");
            ApiConfig::from_yaml_file(&path)?
        }
        None => ApiConfig::default(),
    }
    .with_env_overrides()?;

    let addr = config.listen_addr.clone();
    let store = InMemoryStore::with_separator(&config.separator);

    ServerBuilder::new()
        .with_config(config)
        .with_in_memory_store(store)
        .serve(&addr)
        .await
}
