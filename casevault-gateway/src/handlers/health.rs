// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared state for health endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Database and object store reachable (true = healthy)
    pub backends_healthy: Arc<AtomicBool>,
    /// Flag indicating if we're shutting down
    pub shutting_down: Arc<AtomicBool>,
}

impl HealthState {
    pub fn new(backends_healthy: Arc<AtomicBool>) -> Self {
        Self {
            backends_healthy,
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Health check response body.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    backends: Option<&'static str>,
}

/// Kubernetes liveness probe endpoint.
///
/// Returns 200 OK if the process is alive.
/// This endpoint should always return success unless the process is deadlocked.
///
/// # Endpoint
/// `GET /health/live`
pub async fn health_live() -> Response {
    let response = HealthResponse {
        status: "ok",
        backends: None,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Kubernetes readiness probe endpoint.
///
/// Returns 200 OK if the service is ready to accept traffic.
/// Returns 503 if:
/// - The service is shutting down
/// - The database or the object store is unreachable
///
/// # Endpoint
/// `GET /health/ready`
pub async fn health_ready(State(state): State<HealthState>) -> Response {
    // Not ready if shutting down
    if state.shutting_down.load(Ordering::SeqCst) {
        let response = HealthResponse {
            status: "shutting_down",
            backends: None,
        };
        return (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response();
    }

    if state.backends_healthy.load(Ordering::SeqCst) {
        let response = HealthResponse {
            status: "ok",
            backends: Some("healthy"),
        };
        (StatusCode::OK, Json(response)).into_response()
    } else {
        // Every route needs both backends.
        let response = HealthResponse {
            status: "degraded",
            backends: Some("unhealthy"),
        };
        (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response()
    }
}

/// Kubernetes startup probe endpoint.
///
/// Returns 200 OK once the service has completed initialization
/// (migrations applied, bucket provisioned, admin seeded).
///
/// # Endpoint
/// `GET /health/startup`
pub async fn health_startup() -> Response {
    let response = HealthResponse {
        status: "ok",
        backends: None,
    };
    (StatusCode::OK, Json(response)).into_response()
}
