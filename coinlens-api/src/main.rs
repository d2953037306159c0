//! coinlens-api - Coin identification backend
//!
//! Accepts front/back photos of a coin, asks the Gemini API to identify it,
//! stores the images and metadata, and serves the stored records.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use coinlens_api::services::{GeminiClient, ImageStore};
use coinlens_api::{build_router, AppState};
use coinlens_common::config::{
    self, AppConfig, GeminiConfig, DEFAULT_DATABASE_URL, DEFAULT_GEMINI_BASE_URL,
    DEFAULT_GEMINI_MODEL, DEFAULT_UPLOAD_DIR,
};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for coinlens-api
#[derive(Parser, Debug)]
#[command(name = "coinlens-api")]
#[command(about = "Coin identification backend")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = config::DEFAULT_PORT, env = "PORT")]
    port: u16,

    /// Database connection string
    #[arg(long, default_value = DEFAULT_DATABASE_URL, env = "DATABASE_URL")]
    database_url: String,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Gemini model used for identification
    #[arg(long, default_value = DEFAULT_GEMINI_MODEL, env = "GEMINI_MODEL")]
    gemini_model: String,

    /// Gemini API base URL
    #[arg(long, default_value = DEFAULT_GEMINI_BASE_URL, env = "GEMINI_BASE_URL")]
    gemini_base_url: String,

    /// Directory where coin images are stored and served from
    #[arg(short, long, default_value = DEFAULT_UPLOAD_DIR, env = "COINLENS_UPLOAD_DIR")]
    upload_dir: PathBuf,
}

impl Args {
    fn into_config(self) -> coinlens_common::Result<AppConfig> {
        AppConfig {
            port: self.port,
            database_url: self.database_url,
            upload_dir: self.upload_dir,
            gemini: GeminiConfig {
                api_key: self.gemini_api_key.unwrap_or_default(),
                model: self.gemini_model,
                base_url: self.gemini_base_url,
            },
        }
        .validate()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before the log filter and clap read the environment
    let env_file = config::load_env_file();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinlens_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting CoinLens backend v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match env_file {
        Some(path) => info!("Loaded environment overrides from {}", path.display()),
        None => info!("No .env file found, using system environment variables"),
    }

    let config = Args::parse().into_config()?;

    let pool = match coinlens_api::db::init_database_pool(&config.database_url).await {
        Ok(pool) => {
            info!("Connected to database");
            pool
        }
        Err(e) => {
            error!("Could not connect to database: {}", e);
            return Err(e.into());
        }
    };

    let recognizer =
        GeminiClient::new(&config.gemini).context("Could not create Gemini client")?;
    info!("Gemini client ready (model {})", config.gemini.model);

    let images = ImageStore::new(&config.upload_dir);
    images
        .ensure_root()
        .with_context(|| format!("Could not create upload directory {}", config.upload_dir.display()))?;
    info!("Image storage: {}", config.upload_dir.display());

    let state = AppState::new(pool, Arc::new(recognizer), images);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
