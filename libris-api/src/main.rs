//! libris-api - Book catalog REST service
//!
//! Serves the author and book catalog over HTTP. Startup resolves the root
//! folder, opens (and if needed creates) the SQLite database, generates the
//! first-run admin token, then runs the axum server until shutdown.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris_api::{build_router, AppState};
use libris_common::config::resolve_root_folder;
use libris_common::db::{init_database, initialize_admin_token};

/// Command-line arguments for libris-api
#[derive(Parser, Debug)]
#[command(name = "libris-api")]
#[command(about = "Book catalog REST service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5840", env = "LIBRIS_PORT")]
    port: u16,

    /// Root folder holding the catalog database
    #[arg(short, long, env = "LIBRIS_ROOT_FOLDER")]
    root_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "libris_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    // Log build identification immediately after tracing init
    info!(
        "Starting Libris Book Catalog (libris-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Root folder: CLI > environment > config file > platform default
    let root_folder = resolve_root_folder(
        args.root_folder.as_deref(),
        "LIBRIS_ROOT_FOLDER",
        Some("root_folder"),
    )?;
    info!("Root folder: {}", root_folder.display());

    let db_path = root_folder.join("libris.db");
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database initialized");

    // First run only: mint the admin token and show it once
    if let Some(token) = initialize_admin_token(&pool)
        .await
        .context("Failed to initialize admin token")?
    {
        info!("Generated admin API token: {}", token);
        info!("Store it now - it will not be shown again");
    }

    // Load runtime settings and build the router
    let fallback_base_url = format!("http://127.0.0.1:{}", args.port);
    let state = AppState::initialize(pool, fallback_base_url)
        .await
        .context("Failed to load runtime settings")?;
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
