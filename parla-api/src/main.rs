//! parla-api - REST backend for the Parla language-practice app
//!
//! Hosts the quiz, article, account, and history endpoints and the
//! audio submission pipeline (ffmpeg transcode + external speech
//! recognizer).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use parla_api::{build_router, AppState};
use parla_common::db::init_database;
use parla_common::Config;

#[derive(Parser, Debug)]
#[command(name = "parla-api", version, about = "Parla language-practice API server")]
struct Cli {
    /// Root folder for the database and audio scratch space
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// HTTP port to listen on
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately, before any slow startup work
    info!(
        "Starting Parla API (parla-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();

    let config = Config::resolve(cli.root_folder, cli.port)
        .context("failed to resolve configuration")?;
    config
        .ensure_directories()
        .context("failed to create data directories")?;

    info!("Root folder: {}", config.root_folder.display());
    info!(
        "Tools: encoder={} recognizer={}",
        config.encoder_path, config.recognizer_path
    );

    let db_path = config.database_path();
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    info!("Database ready: {}", db_path.display());

    let state = AppState::new(pool, &config);
    let app = build_router(state);

    let addr = format!("{}:{}", config.http_host, config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("parla-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
