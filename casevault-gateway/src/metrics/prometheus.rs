// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounter, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Prometheus metrics for the case records gateway.
///
/// Thread-safe metrics registry for request latency and throughput,
/// authorization denials, evidence operations, audit-write failures and
/// backend health.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    /// Request duration histogram: casevault_request_duration_seconds{method, route, status}
    request_duration: HistogramVec,

    /// Request counter: casevault_request_total{method, route, status}
    request_total: CounterVec,

    /// Denials by the authorization gate: casevault_authz_denials_total{reason}
    authz_denials: CounterVec,

    /// Evidence lifecycle operations: casevault_evidence_operations_total{operation, outcome}
    evidence_operations: CounterVec,

    /// Audit entries that could not be written
    audit_write_failures: IntCounter,

    /// Backend health gauge: casevault_backend_health{backend} (1=up, 0=down)
    backend_health: GaugeVec,
}

impl Metrics {
    /// Create a new metrics registry with all gauges initialized.
    pub fn new() -> Self {
        let registry = Registry::new();

        // Request duration: buckets from 1ms to 10s (exponential)
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "casevault_request_duration_seconds",
                "Request duration in seconds",
            )
            .buckets(vec![
                0.001, 0.002, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "route", "status"],
        )
        .expect("failed to create request_duration histogram");

        let request_total = CounterVec::new(
            Opts::new("casevault_request_total", "Total number of requests"),
            &["method", "route", "status"],
        )
        .expect("failed to create request_total counter");

        let authz_denials = CounterVec::new(
            Opts::new(
                "casevault_authz_denials_total",
                "Requests denied by the authorization gate",
            ),
            &["reason"],
        )
        .expect("failed to create authz_denials counter");

        let evidence_operations = CounterVec::new(
            Opts::new(
                "casevault_evidence_operations_total",
                "Evidence lifecycle operations",
            ),
            &["operation", "outcome"],
        )
        .expect("failed to create evidence_operations counter");

        let audit_write_failures = IntCounter::new(
            "casevault_audit_write_failures_total",
            "Audit entries that could not be persisted",
        )
        .expect("failed to create audit_write_failures counter");

        let backend_health = GaugeVec::new(
            Opts::new(
                "casevault_backend_health",
                "Backend health status (1=up, 0=down)",
            ),
            &["backend"],
        )
        .expect("failed to create backend_health gauge");

        // Register all metrics
        registry
            .register(Box::new(request_duration.clone()))
            .expect("failed to register request_duration");
        registry
            .register(Box::new(request_total.clone()))
            .expect("failed to register request_total");
        registry
            .register(Box::new(authz_denials.clone()))
            .expect("failed to register authz_denials");
        registry
            .register(Box::new(evidence_operations.clone()))
            .expect("failed to register evidence_operations");
        registry
            .register(Box::new(audit_write_failures.clone()))
            .expect("failed to register audit_write_failures");
        registry
            .register(Box::new(backend_health.clone()))
            .expect("failed to register backend_health");

        // Backends start as up until the first probe says otherwise
        backend_health.with_label_values(&["database"]).set(1.0);
        backend_health.with_label_values(&["object_store"]).set(1.0);

        Self {
            registry: Arc::new(registry),
            request_duration,
            request_total,
            authz_denials,
            evidence_operations,
            audit_write_failures,
            backend_health,
        }
    }

    /// Record a served request.
    pub fn record_request(&self, method: &str, route: &str, duration: Duration, status: u16) {
        let status_str = status.to_string();

        self.request_duration
            .with_label_values(&[method, route, &status_str])
            .observe(duration.as_secs_f64());
        self.request_total
            .with_label_values(&[method, route, &status_str])
            .inc();
    }

    pub fn record_authz_denial(&self, reason: &str) {
        self.authz_denials.with_label_values(&[reason]).inc();
    }

    /// Record an evidence operation, `outcome` is "ok" or an error class.
    pub fn record_evidence_operation(&self, operation: &str, outcome: &str) {
        self.evidence_operations
            .with_label_values(&[operation, outcome])
            .inc();
    }

    pub fn record_audit_write_failure(&self) {
        self.audit_write_failures.inc();
    }

    /// Set backend health status.
    pub fn set_backend_health(&self, backend: &str, healthy: bool) {
        self.backend_health
            .with_label_values(&[backend])
            .set(if healthy { 1.0 } else { 0.0 });
    }

    /// Encode metrics in Prometheus text format.
    pub fn encode(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Request metrics middleware. Labels by matched route template, not raw path.
pub async fn track_requests(
    State(metrics): State<Metrics>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics.record_request(&method, &route, started.elapsed(), response.status().as_u16());
    response
}
