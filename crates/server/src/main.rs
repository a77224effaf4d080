//! Foodgram server entry point.

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use foodgram_api::{AppState, MAX_BODY_BYTES, router as api_router, short_link_router};
use foodgram_common::{Config, LocalStorage};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodgram=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting foodgram server...");

    let config = Config::load()?;

    let db = foodgram_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    foodgram_db::migrate(&db).await?;
    info!("Migrations completed");

    let storage = Arc::new(LocalStorage::new(
        config.media.root.clone(),
        config.media.url.clone(),
    ));
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let media_root = config.media.root.clone();
    let media_url = config.media.url.clone();

    let state = AppState::new(Arc::new(db), config, storage);

    let mut app = Router::new()
        .nest("/api", api_router())
        .merge(short_link_router());

    // Absolute media URLs point at some other host
    if media_url.starts_with('/') {
        info!(root = %media_root.display(), url = %media_url, "Serving uploaded media");
        app = app.nest_service(&media_url, ServeDir::new(media_root));
    }

    let app = app
        .layer(middleware::from_fn_with_state(
            state.clone(),
            foodgram_api::middleware::auth_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
