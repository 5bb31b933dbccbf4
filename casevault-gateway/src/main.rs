use anyhow::Result;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use casevault_gateway::auth::TokenService;
use casevault_gateway::config::Config;
use casevault_gateway::handlers::HealthState;
use casevault_gateway::health::HealthChecker;
use casevault_gateway::metrics::Metrics;
use casevault_gateway::objects::{MemoryObjectStore, ObjectStore, S3ObjectStore};
use casevault_gateway::store::{MemoryStore, PgStore, Store};
use casevault_gateway::users::seed_default_admin;
use casevault_gateway::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config);

    tracing::info!(
        host = %config.host,
        port = config.port,
        database = if config.database_url.is_some() { "postgres" } else { "memory" },
        storage_backend = %config.storage_backend,
        bucket = %config.minio_bucket,
        "starting casevault-gateway"
    );

    // Relational store
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url, config.database_max_connections).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, records are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    // Object store, bucket provisioned before serving
    let objects: Arc<dyn ObjectStore> = if config.uses_memory_objects() {
        tracing::warn!("object store backend is in-memory");
        Arc::new(MemoryObjectStore::new())
    } else {
        Arc::new(S3ObjectStore::from_config(&config)?)
    };
    objects.ensure_bucket(&config.minio_bucket).await?;

    if config.seed_admin && seed_default_admin(&store).await? {
        tracing::info!("default administrator seeded");
    }

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Create metrics registry
    let metrics = Metrics::new();

    // Create health checker
    let health_checker = Arc::new(HealthChecker::new(
        Arc::clone(&store),
        Arc::clone(&objects),
        config.minio_bucket.clone(),
        Duration::from_secs(config.health_check_interval_secs),
        metrics.clone(),
    ));
    let health = HealthState::new(health_checker.state());
    let shutting_down = Arc::clone(&health.shutting_down);

    // Spawn health checker task
    let health_shutdown_rx = shutdown_tx.subscribe();
    let health_checker_clone = Arc::clone(&health_checker);
    tokio::spawn(async move {
        health_checker_clone.run(health_shutdown_rx).await;
    });

    let state = AppState::new(
        store,
        objects,
        &config.minio_bucket,
        TokenService::new(&config.auth_secret, config.auth_expiry_hours),
        metrics,
        health,
    );
    let app = build_router(state);

    // Create TCP listener
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "listening for connections");

    // Spawn graceful shutdown handler
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("shutdown signal received, initiating graceful shutdown");

        // Mark as shutting down (health check will return not ready)
        shutting_down.store(true, Ordering::SeqCst);

        // Signal all tasks to stop
        let _ = shutdown_tx_clone.send(());
    });

    // Run server with graceful shutdown; peer address feeds audit entries
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let mut rx = shutdown_tx.subscribe();
        let _ = rx.recv().await;
    })
    .await?;

    tracing::info!("casevault-gateway stopped");
    Ok(())
}

/// Initialize tracing based on configuration.
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
