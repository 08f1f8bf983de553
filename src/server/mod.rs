//! The `oflp-api` service
//!
//! Two public endpoints: `GET /api` describes the surface and
//! `GET /api/health` reports liveness. Both sit behind a CORS allow-list
//! so the local development frontends can reach them.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::error::{ConfigError, Result};
use crate::provider::HealthStatus;

/// Shared request state.
#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    environment: String,
}

/// `GET /api` response body.
#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Endpoint path by label, sorted for stable output.
    pub endpoints: BTreeMap<String, String>,
}

/// Build the service router.
pub fn router(config: &ServerConfig) -> Result<Router> {
    let state = Arc::new(AppState {
        started_at: Instant::now(),
        environment: config.environment.clone(),
    });

    let cors = build_cors_layer(&config.cors_origins)?;

    Ok(Router::new()
        .route("/api", get(api_info))
        .route("/api/health", get(health))
        .layer(cors)
        .with_state(state))
}

/// Bind the configured port and serve until shutdown.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let app = router(&config)?;
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("oflp-api listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// CORS allow-list for the configured origins.
fn build_cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let mut allowed: Vec<HeaderValue> = Vec::with_capacity(origins.len());
    for origin in origins {
        let value = origin
            .parse::<HeaderValue>()
            .map_err(|_| ConfigError::InvalidOrigin(origin.clone()))?;
        allowed.push(value);
    }

    Ok(CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(allowed))
}

async fn api_info() -> Json<ApiInfo> {
    let mut endpoints = BTreeMap::new();
    endpoints.insert("health".to_string(), "/api/health".to_string());

    Json(ApiInfo {
        name: "OFLP API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Ocean freight logistics platform API".to_string(),
        endpoints,
    })
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.environment.clone(),
    })
}
