//! Image metadata service
//!
//! Stores image filename/description pairs in SQLite and serves them back
//! as JSON over a single `/images` route.

mod error;
mod handlers;
mod storage;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use storage::Database;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting imgmeta-server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    info!(
        "Config loaded: port={}, db={}, table={}",
        config.port, config.database_path, config.table_name
    );

    let db = Arc::new(
        Database::new(&config.database_path, &config.table_name)
            .await
            .context("Failed to initialize database")?,
    );
    info!("SQLite database initialized at: {}", config.database_path);

    let state = AppState { db };
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Builds the router: one route, two supported methods, everything else
/// answered by the method fallback.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/images",
            get(handlers::images::list)
                .post(handlers::images::create)
                .fallback(handlers::images::method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Clone)]
struct Config {
    port: u16,
    database_path: String,
    table_name: String,
}

/// Reads configuration from the environment. Only the port is validated
/// here; a missing database path or table name is reported but left to
/// fail at the storage layer. Note that an empty database path makes
/// SQLite open a private temporary database, so nothing written there
/// survives the process.
fn load_config() -> Result<Config> {
    let port = std::env::var("SERVER_PORT")
        .context("SERVER_PORT is not set")?
        .parse::<u16>()
        .context("SERVER_PORT is not a valid port number")?;

    let database_path = std::env::var("DATABASE_FILE_PATH").unwrap_or_else(|_| {
        warn!("DATABASE_FILE_PATH not set, SQLite will use a private temporary database; data will not survive a restart");
        String::new()
    });

    let table_name = std::env::var("IMAGE_TABLE_NAME").unwrap_or_else(|_| {
        warn!("IMAGE_TABLE_NAME not set");
        String::new()
    });

    Ok(Config {
        port,
        database_path,
        table_name,
    })
}
