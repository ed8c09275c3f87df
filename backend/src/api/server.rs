//! HTTP server exposing the dashboard pipeline.
//!
//! A thin wrapper: every request reloads the dataset and runs the pipeline
//! from scratch on a blocking worker thread.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | GET    | `/api/dashboard`  | Full dashboard payload               |
//! | GET    | `/api/logs`       | SSE stream of pipeline logs          |
//! | GET    | `/*`              | Static dashboard assets              |

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use super::logs::{log_warning, LOG_BROADCASTER};
use super::types::error_response;
use crate::analytics::pipeline::{build_dashboard, DashboardPayload, PipelineOptions};
use crate::config::Config;
use crate::error::ServerError;

/// Shared, read-only handler state.
#[derive(Debug, Clone)]
struct AppState {
    data_path: Arc<PathBuf>,
    options: PipelineOptions,
}

/// Build the router without binding a socket.
pub fn router(config: &Config, options: PipelineOptions) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let state = AppState {
        data_path: Arc::new(config.data_path.clone()),
        options,
    };

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/api/dashboard", get(dashboard))
        .route("/api/logs", get(sse_logs));

    if config.static_dir.is_dir() {
        app = app.fallback_service(ServeDir::new(&config.static_dir));
    } else {
        log_warning(format!(
            "Static dir {} not found, serving API only",
            config.static_dir.display()
        ));
        app = app.route("/", get(health));
    }

    app.layer(cors).with_state(state)
}

/// Start the HTTP server
pub async fn start_server(
    config: Config,
    options: PipelineOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(&config, options);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    eprintln!("🚀 Supply-chain dashboard running on http://localhost:{}", config.port);
    eprintln!("   GET /api/dashboard - Dashboard payload");
    eprintln!("   GET /api/logs      - SSE log stream");
    eprintln!("   GET /health        - Health check");
    eprintln!("   Data: {}", config.data_path.display());
    eprintln!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "supplychain",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "dashboard": "GET /api/dashboard",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// Dashboard endpoint: fresh load + full pipeline run
async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardPayload>, (StatusCode, Json<Value>)> {
    let path = Arc::clone(&state.data_path);
    let options = state.options;

    let result = tokio::task::spawn_blocking(move || build_dashboard(path.as_path(), options))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))
        .and_then(|r| r.map_err(ServerError::from));

    result.map(Json).map_err(|e| {
        let (status, body) = error_response(&e);
        (status, Json(body))
    })
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
