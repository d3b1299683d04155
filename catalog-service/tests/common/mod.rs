#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use catalog_service::config::CatalogConfig;
use catalog_service::services::{MemoryStorage, Storage};
use catalog_service::startup::{build_router, AppState, Application};
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_HOST: &str = "files.test";

pub fn test_config() -> CatalogConfig {
    CatalogConfig::for_local("unused")
}

/// Router over an in-memory bucket.
pub fn memory_router(storage: Arc<MemoryStorage>) -> Router {
    let storage: Arc<dyn Storage> = storage;
    build_router(AppState::new(test_config(), storage))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(router: Router, request: Request<Body>) -> TestResponse {
    let response = router.oneshot(request).await.expect("Request failed");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(router: Router, uri: &str) -> TestResponse {
    let request = Request::builder()
        .uri(uri)
        .header("host", TEST_HOST)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

pub async fn post_json(router: Router, uri: &str, body: serde_json::Value) -> TestResponse {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

/// A running server over a local-disk bucket in a temp directory.
pub struct TestApp {
    pub address: String,
    pub ops_address: String,
    pub storage_dir: TempDir,
}

impl TestApp {
    pub async fn spawn(files: &[(&str, &str)]) -> Self {
        let storage_dir = TempDir::new().expect("Failed to create temp dir");
        for (key, data) in files {
            let path = storage_dir.path().join(key);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create object dir");
            }
            std::fs::write(&path, data.as_bytes()).expect("Failed to write object");
        }

        let config = CatalogConfig::for_local(storage_dir.path().to_string_lossy().into_owned());
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let address = format!("http://127.0.0.1:{}", app.port());
        let ops_address = format!("http://127.0.0.1:{}", app.ops_port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let health_url = format!("{}/health", ops_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            ops_address,
            storage_dir,
        }
    }
}
