// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::metrics::Metrics;
use crate::objects::ObjectStore;
use crate::store::Store;

/// Backend health checker.
///
/// Periodically pings the relational store and the object store, exports the
/// result as a gauge and keeps a shared flag for the readiness probe.
/// Stops on the shutdown broadcast.
pub struct HealthChecker {
    store: Arc<dyn Store>,
    objects: Arc<dyn ObjectStore>,
    bucket: String,
    check_interval: Duration,
    metrics: Metrics,
    current_state: Arc<AtomicBool>,
    outage_count: Arc<AtomicU64>,
}

impl HealthChecker {
    pub fn new(
        store: Arc<dyn Store>,
        objects: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        check_interval: Duration,
        metrics: Metrics,
    ) -> Self {
        Self {
            store,
            objects,
            bucket: bucket.into(),
            check_interval,
            metrics,
            current_state: Arc::new(AtomicBool::new(true)), // Assume healthy initially
            outage_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run the check loop until a shutdown signal is received.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.check_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(
            interval_secs = self.check_interval.as_secs(),
            bucket = %self.bucket,
            "starting backend health checker"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.check_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("health checker received shutdown signal");
                    break;
                }
            }
        }

        tracing::info!("health checker stopped");
    }

    /// Ping both backends once and update the shared state.
    pub async fn check_once(&self) -> bool {
        let database = match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(backend = "database", error = %e, "backend health check failed");
                false
            }
        };
        let object_store = match self.objects.ping(&self.bucket).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(backend = "object_store", error = %e, "backend health check failed");
                false
            }
        };
        self.metrics.set_backend_health("database", database);
        self.metrics.set_backend_health("object_store", object_store);

        let is_healthy = database && object_store;
        let was_healthy = self.current_state.swap(is_healthy, Ordering::SeqCst);

        if was_healthy && !is_healthy {
            let count = self.outage_count.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(
                event = "outage",
                database,
                object_store,
                total_outages = count,
                "backends became unhealthy"
            );
        } else if !was_healthy && is_healthy {
            tracing::info!(event = "recovery", "backends recovered");
        }
        is_healthy
    }

    pub fn is_healthy(&self) -> bool {
        self.current_state.load(Ordering::SeqCst)
    }

    pub fn outage_count(&self) -> u64 {
        self.outage_count.load(Ordering::Relaxed)
    }

    /// Get an Arc clone of the health state for sharing with handlers.
    pub fn state(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.current_state)
    }
}
