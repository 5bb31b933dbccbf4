// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use crate::metrics::Metrics;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

/// Content type of the Prometheus text exposition format.
const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// `GET /metrics`
///
/// Request counters, authorization denials, evidence operation outcomes,
/// audit write failures and backend health. Scrapes are never cached.
pub async fn metrics_handler(State(metrics): State<Metrics>) -> Response {
    (
        [
            (header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        metrics.encode(),
    )
        .into_response()
}
