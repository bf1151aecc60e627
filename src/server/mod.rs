//! HTTP API: subscribe, unsubscribe and fetch the latest digest.
//!
//! [`AppState`] is built once in `main` before the listener opens and handed
//! to every handler through axum's `State`; nothing in here is global.

pub mod error;
pub mod handlers;

use crate::mailer::Mailer;
use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// `None` when no sender credentials were configured.
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl AppState {
    pub fn new(db: SqlitePool, mailer: Option<Arc<dyn Mailer>>) -> Self {
        Self { db, mailer }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/addSubscriber",
            post(handlers::add_subscriber).fallback(handlers::method_not_allowed),
        )
        .route(
            "/unsubscribeUser",
            post(handlers::unsubscribe_user).fallback(handlers::method_not_allowed),
        )
        .route(
            "/latestNews",
            get(handlers::latest_news).fallback(handlers::method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until Ctrl-C, then return so the caller can close the pool.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), Box<dyn Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
}
