//! basecampd, the asset management server.

use anyhow::Context;
use basecamp_core::config::AppConfig;
use basecamp_server::{AppState, create_router};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "basecampd", about = "Asset management server", version)]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long, env = "BASECAMP_CONFIG", default_value = "basecamp.toml")]
    config: PathBuf,
}

fn load_config(path: &PathBuf) -> anyhow::Result<AppConfig> {
    let mut figment = Figment::new();

    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("BASECAMP_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    config
        .storage
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid storage configuration: {e}"))?;

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "basecamp=info,basecampd=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = load_config(&args.config)?;

    let storage = basecamp_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage backend")?;
    storage
        .health_check()
        .await
        .context("storage backend health check failed")?;
    tracing::info!(backend = storage.backend_name(), "storage initialized");

    let metadata = basecamp_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    metadata
        .health_check()
        .await
        .context("metadata store health check failed")?;
    tracing::info!("metadata store initialized");

    let bind = config.server.bind.clone();
    let state = AppState::new(config, storage, metadata);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(%bind, "listening");

    axum::serve(listener, router)
        .await
        .context("server error")?;

    Ok(())
}
