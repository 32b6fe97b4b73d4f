//! HTTP server implementation for the waypoint graph API

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use crate::core::AppState;

/// Creates the main application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration - the map front-end may be served from elsewhere
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any);

    let import_limit = state.config.storage.max_import_bytes;

    let mut router = Router::new()
        // Root route
        .route("/", get(handlers::root_handler))

        // Graph routes
        .route("/add_node", post(handlers::add_node))
        .route("/add_edge", post(handlers::add_edge))
        .route("/get_edge_weight", post(handlers::get_edge_weight))
        .route("/shortest_path", post(handlers::shortest_path))
        .route("/get_graph", get(handlers::get_graph))
        .route("/reset", post(handlers::reset_graph))

        // File routes
        .route("/export_graph", get(handlers::export_graph))
        .route(
            "/import_graph",
            post(handlers::import_graph).layer(DefaultBodyLimit::max(import_limit)),
        )

        // System routes
        .route("/health", get(handlers::health_check));

    if let Some(static_dir) = &state.config.server.static_dir {
        router = router.nest_service("/static", ServeDir::new(static_dir));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl+C or SIGTERM
pub async fn start_server(state: AppState) -> crate::Result<()> {
    let addr = state.config.server.http_addr;
    tracing::info!("Starting waypoint graph API server on {}", addr);

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on the first shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::warn!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::warn!("Received terminate signal");
        },
    }
}
