//! Server-side proxy for the Climatiq data-versions endpoint.
//!
//! Browsers call `GET /api/data-versions` here; the proxy re-issues the call
//! upstream with the server-held API key, so the key never reaches the client.
//! The upstream body is relayed as received, without re-encoding.
//! Any failure becomes a fixed 500 body; the cause is logged, never returned.

pub mod config;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use climatiq_core::{ClimatiqApi, ClimatiqClient, UreqTransport};
use serde::Serialize;
use tower_http::trace::TraceLayer;

pub use config::Config;

pub const DATA_VERSIONS_ROUTE: &str = "/api/data-versions";
pub const DATA_VERSIONS_FAILURE: &str = "Failed to fetch data versions";

type ConfigSource = dyn Fn() -> Result<Config, envy::Error> + Send + Sync;

/// Shared handler state.
///
/// The upstream URL and key are looked up on every request, so a changed
/// environment applies without a restart. The `ureq` agent and its connection
/// pool are shared across requests.
#[derive(Clone)]
pub struct ProxyState {
    config: Arc<ConfigSource>,
    transport: UreqTransport,
}

impl ProxyState {
    /// Read `API_BASE_URL` / `API_KEY` from the process environment per request.
    pub fn from_env() -> Self {
        Self::with_config_source(Config::from_env)
    }

    /// Always use `config`.
    pub fn fixed(config: Config) -> Self {
        Self::with_config_source(move || Ok(config.clone()))
    }

    pub fn with_config_source<F>(source: F) -> Self
    where
        F: Fn() -> Result<Config, envy::Error> + Send + Sync + 'static,
    {
        Self {
            config: Arc::new(source),
            transport: UreqTransport::new(),
        }
    }

    fn upstream(&self) -> Result<ClimatiqApi, envy::Error> {
        let config = (self.config)()?;
        Ok(ClimatiqApi::with_transport(
            ClimatiqClient::new(&config.api_base_url, &config.api_key),
            self.transport.clone(),
        ))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn app(state: ProxyState) -> Router {
    Router::new()
        .route("/health/live", get(health_live))
        .route(DATA_VERSIONS_ROUTE, get(data_versions).with_state(state))
        .layer(TraceLayer::new_for_http())
}

/// Liveness probe.
///
/// # Endpoint
/// `GET /health/live`
pub async fn health_live() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

/// Relay the upstream data versions.
///
/// Returns the upstream JSON body byte-for-byte with 200, or
/// `{"error": "Failed to fetch data versions"}` with 500 on any failure.
///
/// # Endpoint
/// `GET /api/data-versions`
pub async fn data_versions(State(state): State<ProxyState>) -> Response {
    let api = match state.upstream() {
        Ok(api) => api,
        Err(err) => {
            tracing::error!(error = %err, "proxy configuration is invalid");
            return failure();
        }
    };
    // ureq is blocking; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || api.get_data_versions_raw()).await;

    match outcome {
        Ok(Ok(body)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, status = ?err.status(), "upstream data-versions call failed");
            failure()
        }
        Err(err) => {
            tracing::error!(error = %err, "data-versions task did not complete");
            failure()
        }
    }
}

fn failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: DATA_VERSIONS_FAILURE,
        }),
    )
        .into_response()
}
