mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use catalog_service::services::MemoryStorage;
use common::{get, memory_router, post_json, send, TEST_HOST};
use serde_json::json;
use std::sync::Arc;

const MANIFEST_KEY: &str = "pdfs-as-jpegs/manifest.json";

async fn bucket(keys: &[&str]) -> Arc<MemoryStorage> {
    let storage = Arc::new(MemoryStorage::new());
    for key in keys {
        storage.put(*key, format!("contents of {}", key)).await;
    }
    storage
}

fn keys_of(body: &serde_json::Value) -> Vec<String> {
    body["files"]
        .as_array()
        .expect("files array")
        .iter()
        .map(|f| f["key"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn files_lists_only_pdfs_in_key_order() {
    let storage = bucket(&["VOL1/b.pdf", "VOL1/a.pdf", "VOL1/a.jpg", "notes.txt"]).await;

    let response = get(memory_router(storage), "/api/files").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(keys_of(&body), vec!["VOL1/a.pdf", "VOL1/b.pdf"]);
    assert_eq!(body["truncated"], false);
    assert_eq!(body["cursor"], serde_json::Value::Null);
    assert_eq!(body["totalReturned"], 2);
    assert!(body["files"][0]["uploaded"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn files_pages_through_with_cursor() {
    let storage = bucket(&["a.pdf", "b.pdf", "c.pdf", "d.pdf", "e.pdf"]).await;
    let router = memory_router(storage);

    let first = get(router.clone(), "/api/files?limit=2").await.json();
    assert_eq!(keys_of(&first), vec!["a.pdf", "b.pdf"]);
    assert_eq!(first["truncated"], true);
    let cursor = first["cursor"].as_str().unwrap().to_string();

    let uri = format!("/api/files?limit=2&cursor={}", urlencoding::encode(&cursor));
    let second = get(router.clone(), &uri).await.json();
    assert_eq!(keys_of(&second), vec!["c.pdf", "d.pdf"]);
    assert_eq!(second["truncated"], true);

    let cursor = second["cursor"].as_str().unwrap().to_string();
    let uri = format!("/files?limit=2&cursor={}", urlencoding::encode(&cursor));
    let third = get(router, &uri).await.json();
    assert_eq!(keys_of(&third), vec!["e.pdf"]);
    assert_eq!(third["truncated"], false);
    assert_eq!(third["cursor"], serde_json::Value::Null);
}

#[tokio::test]
async fn files_drains_upstream_pages_past_non_pdf_objects() {
    let storage = Arc::new(MemoryStorage::new().with_page_size(2));
    for key in ["a.jpg", "b.jpg", "c.jpg", "d.pdf", "e.jpg", "f.pdf"] {
        storage.put(key, "x").await;
    }

    let body = get(memory_router(storage.clone()), "/api/files?limit=1")
        .await
        .json();

    assert_eq!(keys_of(&body), vec!["d.pdf"]);
    assert_eq!(body["truncated"], true);
    assert_eq!(body["cursor"], "d.pdf");
    assert!(storage.list_calls() >= 2);
}

#[tokio::test]
async fn files_filters_by_prefix() {
    let storage = bucket(&["VOL1/a.pdf", "VOL2/b.pdf", "VOL2/c.pdf"]).await;

    let body = get(memory_router(storage), "/api/files?prefix=VOL2/")
        .await
        .json();

    assert_eq!(keys_of(&body), vec!["VOL2/b.pdf", "VOL2/c.pdf"]);
}

#[tokio::test]
async fn files_limit_is_clamped_and_tolerant() {
    let storage = bucket(&["a.pdf", "b.pdf"]).await;
    let router = memory_router(storage);

    let zero = get(router.clone(), "/api/files?limit=0").await.json();
    assert_eq!(keys_of(&zero), vec!["a.pdf"]);
    assert_eq!(zero["truncated"], true);

    let garbage = get(router, "/api/files?limit=lots").await;
    assert_eq!(garbage.status, StatusCode::OK);
    assert_eq!(keys_of(&garbage.json()).len(), 2);
}

#[tokio::test]
async fn all_files_appends_manifest_only_keys() {
    let storage = bucket(&["VOL1/a.pdf", "VOL1/b.pdf"]).await;
    storage
        .put(
            MANIFEST_KEY,
            json!({"VOL1/b.pdf": {"pages": 2}, "VOL9/z.pdf": {"pages": 7}}).to_string(),
        )
        .await;

    let body = get(memory_router(storage), "/api/all-files").await.json();

    assert_eq!(keys_of(&body), vec!["VOL1/a.pdf", "VOL1/b.pdf", "VOL9/z.pdf"]);
    assert_eq!(body["totalReturned"], 3);
    assert_eq!(body["files"][2]["size"], 0);
}

#[tokio::test]
async fn all_files_survives_broken_manifest() {
    let storage = bucket(&["VOL1/a.pdf"]).await;
    storage.put(MANIFEST_KEY, "{not json").await;

    let response = get(memory_router(storage), "/api/all-files").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(keys_of(&response.json()), vec!["VOL1/a.pdf"]);
}

#[tokio::test]
async fn files_by_keys_returns_found_keys_sorted() {
    let storage = bucket(&["VOL1/a.pdf", "VOL1/b.pdf"]).await;
    storage.fail_key("VOL1/b.pdf").await;

    let response = post_json(
        memory_router(storage),
        "/api/files-by-keys",
        json!({"keys": ["VOL1/missing.pdf", "VOL1/b.pdf", "VOL1/a.pdf", "VOL1/a.pdf"]}),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(keys_of(&body), vec!["VOL1/a.pdf"]);
    assert_eq!(body["totalReturned"], 1);
}

#[tokio::test]
async fn files_by_keys_accepts_empty_body_object() {
    let storage = bucket(&["VOL1/a.pdf"]).await;

    let response = post_json(memory_router(storage), "/api/files-by-keys", json!({})).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["totalReturned"], 0);
}

#[tokio::test]
async fn files_by_keys_treats_null_keys_as_empty() {
    let storage = bucket(&["VOL1/a.pdf"]).await;

    let response = post_json(
        memory_router(storage),
        "/api/files-by-keys",
        json!({"keys": null}),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["totalReturned"], 0);
}

#[tokio::test]
async fn root_path_is_404() {
    let storage = bucket(&[]).await;
    // Backends reject an empty key rather than reporting it missing.
    storage.fail_key("").await;

    let response = get(memory_router(storage), "/").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "Not Found");
    assert_eq!(response.header("location"), None);
}

#[tokio::test]
async fn get_on_batch_route_serves_object_path() {
    let storage = bucket(&[]).await;

    let response = get(memory_router(storage), "/api/files-by-keys").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "Not Found");
}

#[tokio::test]
async fn manifest_is_passed_through() {
    let storage = bucket(&[]).await;
    let manifest = r#"{"VOL1/a.pdf":{"pages":3}}"#;
    storage.put(MANIFEST_KEY, manifest).await;

    let response = get(memory_router(storage), "/api/pdf-manifest").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.text(), manifest);
}

#[tokio::test]
async fn missing_manifest_is_404() {
    let response = get(memory_router(bucket(&[]).await), "/api/pdf-manifest").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "Manifest not found");
}

#[tokio::test]
async fn og_preview_links_thumbnail_on_request_origin() {
    let response = get(
        memory_router(bucket(&[]).await),
        "/og?file=VOL1/IMAGES/0001/EFTA00000001.pdf",
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("content-type"),
        Some("text/html; charset=utf-8")
    );
    assert_eq!(
        response.header("cache-control"),
        Some("public, max-age=86400")
    );
    let html = response.text();
    assert!(html.contains(&format!(
        r#"<meta property="og:image" content="http://{}/thumbnails/VOL1/IMAGES/0001/EFTA00000001.jpg">"#,
        TEST_HOST
    )));
    assert!(html.contains("EFTA00000001"));
}

#[tokio::test]
async fn og_preview_requires_file() {
    let router = memory_router(bucket(&[]).await);

    let missing = get(router.clone(), "/api/og").await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.text(), "Missing file parameter");

    let empty = get(router, "/api/og?file=").await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn objects_are_streamed_with_headers() {
    let storage = Arc::new(MemoryStorage::new());
    storage.put("VOL1/EFTA00000001.pdf", b"%PDF-1.4".to_vec()).await;

    let response = get(memory_router(storage), "/VOL1/EFTA00000001.pdf").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("application/pdf"));
    assert_eq!(response.header("content-length"), Some("8"));
    assert_eq!(
        response.header("content-disposition"),
        Some(r#"inline; filename="EFTA00000001.pdf""#)
    );
    assert_eq!(
        response.header("cache-control"),
        Some("public, max-age=31536000, immutable")
    );
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    assert_eq!(&response.body[..], b"%PDF-1.4");
}

#[tokio::test]
async fn object_keys_are_percent_decoded() {
    let storage = bucket(&["VOL1/with space.pdf"]).await;

    let response = get(memory_router(storage), "/VOL1/with%20space.pdf").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "contents of VOL1/with space.pdf");
}

#[tokio::test]
async fn thumbnails_are_served_as_jpeg() {
    let storage = bucket(&["thumbnails/VOL1/x.jpg"]).await;

    let response = get(memory_router(storage), "/thumbnails/VOL1/x.jpg").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("image/jpeg"));
}

#[tokio::test]
async fn missing_volume_pdf_redirects_to_external_documents() {
    let response = get(
        memory_router(bucket(&[]).await),
        "/VOL00007/IMAGES/0001/EFTA00000001.pdf",
    )
    .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(
        response.header("location"),
        Some("https://www.justice.gov/epstein/files/DataSet%207/EFTA00000001.pdf")
    );
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    assert_eq!(response.header("cache-control"), None);
}

#[tokio::test]
async fn missing_non_volume_object_is_404() {
    let response = get(memory_router(bucket(&[]).await), "/thumbnails/VOL1/x.jpg").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "Not Found");
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    assert_eq!(
        response.header("cache-control"),
        Some("public, max-age=31536000, immutable")
    );
}

#[tokio::test]
async fn preflight_is_answered_on_any_path() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/VOL1/anything.pdf")
        .body(Body::empty())
        .unwrap();

    let response = send(memory_router(bucket(&[]).await), request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    assert_eq!(
        response.header("access-control-allow-methods"),
        Some("GET, HEAD, POST, OPTIONS")
    );
    assert_eq!(
        response.header("access-control-allow-headers"),
        Some("Content-Type")
    );
}

#[tokio::test]
async fn storage_failures_are_reported_as_500() {
    let storage = bucket(&["VOL1/a.pdf"]).await;
    storage.fail_key("VOL1/a.pdf").await;

    let response = get(memory_router(storage), "/VOL1/a.pdf").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    assert_eq!(response.header("cache-control"), None);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let request = Request::builder()
        .uri("/api/files")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();

    let response = send(memory_router(bucket(&[]).await), request).await;

    assert_eq!(response.header("x-request-id"), Some("abc-123"));
}
