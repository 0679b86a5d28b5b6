//! HTTP server setup.

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::{not_found_handler, query_handler, query_page_handler, AppState};
use crate::error::{DuckieError, Result};
use crate::query::QueryService;

/// Builds the application router. Only `/` and `/query` are served.
pub fn router(service: QueryService) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/", get(query_page_handler))
        .route("/query", get(query_page_handler).post(query_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the listen address and serves the router until shutdown.
pub struct HttpServer {
    addr: SocketAddr,
    service: QueryService,
}

impl HttpServer {
    pub fn new(addr: SocketAddr, service: QueryService) -> Self {
        Self { addr, service }
    }

    pub async fn serve(self) -> Result<()> {
        let app = router(self.service);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| DuckieError::internal(format!("Failed to bind {}: {e}", self.addr)))?;

        info!("HTTP server listening on {}", self.addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| DuckieError::internal(format!("HTTP server failed: {e}")))?;

        Ok(())
    }
}
