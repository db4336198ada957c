// MoMo Ledger - Web Server
// Read-only query API over stored transactions, plus the dashboard assets

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use clap::Parser;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use momo_ledger::{get_summary, get_transactions, Config, DateFilter};

#[derive(Parser)]
#[command(name = "momo-server")]
#[command(version, about = "Serve the transaction ledger over HTTP", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, default_value = "momo-ledger.toml")]
    config: PathBuf,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::internal("database lock poisoned"))
    }
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

/// `from` / `to` query parameters, both inclusive
#[derive(Debug, Default, Deserialize)]
struct DateQuery {
    from: Option<String>,
    to: Option<String>,
}

impl DateQuery {
    fn filter(&self) -> Result<DateFilter, ApiError> {
        DateFilter::parse(self.from.as_deref(), self.to.as_deref())
            .map_err(|e| ApiError::bad_request(format!("{:#}", e)))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::internal(format!("{:#}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(HealthBody { status: "ok" })
}

/// GET /api/transactions - Stored transactions, newest first
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.filter()?;
    let conn = state.conn()?;
    let rows = get_transactions(&conn, &filter)?;
    Ok(Json(rows))
}

/// GET /api/summary - Count and total per transaction type
async fn summary(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.filter()?;
    let conn = state.conn()?;
    let rows = get_summary(&conn, &filter)?;
    Ok(Json(rows))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/transactions", get(list_transactions))
        .route("/summary", get(summary))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(&config.server.static_dir));

    let base = config.server.base_path.trim_end_matches('/');
    let router = if base.is_empty() {
        app
    } else {
        Router::new().nest(base, app)
    };

    router.layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,momo_ledger=debug,momo_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    // Open database
    let db_path = &config.paths.database;
    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {} (run `momo-ledger import` first)",
            db_path.display()
        );
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    info!(path = %db_path.display(), "database opened");

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.bind))?;

    info!(
        "Server running on http://{}{}",
        config.server.bind, config.server.base_path
    );

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
