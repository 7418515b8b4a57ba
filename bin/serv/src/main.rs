use std::sync::Arc;

use anyhow::Context;
use axum::{Router, middleware, routing::get};
use smk_api::{
    ApiConfig, ApiState, AuthConfig, EngineSettings,
    clock::SystemClock,
    jobs::start_background_jobs,
    metrics::{init_metrics, metrics_handler, track_metrics},
    middleware::{create_cors_layer, request_id_middleware},
};
use smk_db::PgStore;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env().context("failed to load configuration")?;

    smk_api::tracing::init_tracing(config.env);
    let metrics_handle = init_metrics()?;

    let pool = smk_db::create_pool(&config.database_url, config.db_max_connections).await?;
    smk_db::ensure_db_and_migrate(&config.database_url, &pool).await?;

    let state = ApiState::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(SystemClock::new(config.utc_offset())),
        EngineSettings::from(&config),
        AuthConfig::from(&config),
    );
    let shutdown = state.shutdown.clone();
    let jobs = start_background_jobs(state.ranking.cache(), shutdown.clone());

    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let app = smk_api::router::router()
        .with_state(state)
        .merge(metrics_router)
        .layer(middleware::from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(create_cors_layer(&config.allowed_origins));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    for job in jobs {
        if let Err(e) = job.await {
            tracing::warn!("Background job ended abnormally: {e}");
        }
    }
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM, cancelling every in-flight computation.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
