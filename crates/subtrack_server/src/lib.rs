//! Subscription Service - HTTP API
//!
//! REST endpoints over the subscription record store.

pub mod config;
pub mod error;
pub mod http;
pub mod openapi;
pub mod request_log;

use std::future::Future;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use log::info;
use subtrack_core::Store;
use tower_http::cors::CorsLayer;

pub use config::Config;
pub use error::{ApiError, StartupError};

/// Shared application state
pub struct AppState {
    pub store: Store,
}

impl AppState {
    /// Wraps an opened, migrated store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Subscription endpoints
        .route(
            "/subscriptions",
            post(http::create_subscription).get(http::list_subscriptions),
        )
        .route("/subscriptions/summary", get(http::summarize_subscriptions))
        .route(
            "/subscriptions/{id}",
            get(http::get_subscription)
                .put(http::update_subscription)
                .delete(http::delete_subscription),
        )
        // System endpoints
        .route("/health", get(http::health))
        .route("/openapi.json", get(http::openapi))
        // Middleware
        .layer(middleware::from_fn(request_log::log_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server and run until `shutdown` resolves
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), StartupError> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("event=server_listen module=server status=ok addr={addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
