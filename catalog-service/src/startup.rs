use crate::config::CatalogConfig;
use crate::handlers;
use crate::middleware::edge_headers_middleware;
use crate::services::{build_storage, CatalogLister, Storage};
use axum::{
    body::Body,
    http::Request,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::{request_id_middleware, REQUEST_ID_HEADER};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: CatalogConfig,
    pub storage: Arc<dyn Storage>,
    pub catalog: CatalogLister,
}

impl AppState {
    pub fn new(config: CatalogConfig, storage: Arc<dyn Storage>) -> Self {
        let catalog = CatalogLister::new(storage.clone(), config.manifest_key.clone());
        Self {
            config,
            storage,
            catalog,
        }
    }
}

/// Public routes. Every path without a route is an object key.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/pdf-manifest", get(handlers::get_manifest))
        .route("/og", get(handlers::og_preview))
        .route("/api/og", get(handlers::og_preview))
        .route("/api/all-files", get(handlers::all_files))
        .route("/api/files", get(handlers::list_files))
        .route("/files", get(handlers::list_files))
        .route(
            "/api/files-by-keys",
            post(handlers::files_by_keys).fallback(handlers::serve_object),
        )
        .fallback(handlers::serve_object)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(edge_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .headers()
                    .get(&REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Health, readiness and Prometheus metrics, served on the ops port.
pub fn build_ops_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .with_state(state)
}

async fn bind(port: u16, name: &str) -> Result<TcpListener, AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind {} listener to {}: {}", name, addr, e);
        AppError::from(e)
    })
}

pub struct Application {
    port: u16,
    ops_port: u16,
    server: Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>,
}

impl Application {
    pub async fn build(config: CatalogConfig) -> Result<Self, AppError> {
        let storage = build_storage(&config.storage).await.map_err(|e| {
            tracing::error!(backend = ?config.storage.backend, "Failed to initialize storage: {}", e);
            e
        })?;

        Self::build_with_storage(config, storage).await
    }

    pub async fn build_with_storage(
        config: CatalogConfig,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(config, storage);

        let listener = bind(state.config.common.port, "http").await?;
        let ops_listener = bind(state.config.common.ops_port, "ops").await?;
        let port = listener.local_addr()?.port();
        let ops_port = ops_listener.local_addr()?.port();

        tracing::info!(port, ops_port, "Listening");

        let api = axum::serve(listener, build_router(state.clone())).into_future();
        let ops = axum::serve(ops_listener, build_ops_router(state)).into_future();
        let server = Box::pin(async move { tokio::try_join!(api, ops).map(|_| ()) });

        Ok(Self {
            port,
            ops_port,
            server,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn ops_port(&self) -> u16 {
        self.ops_port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
