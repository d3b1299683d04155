use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Bucket content never changes once published.
pub const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";
pub const ALLOWED_METHODS: &str = "GET, HEAD, POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";

/// Answers CORS preflights and stamps CORS and cache headers on responses.
///
/// `Cache-Control` is only added to 2xx and 404 responses that did not set
/// their own, so redirects, client errors and failures are never pinned in
/// caches.
pub async fn edge_headers_middleware(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return preflight_response();
    }

    let mut response = next.run(req).await;
    let status = response.status();
    let headers = response.headers_mut();

    headers
        .entry(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .or_insert(HeaderValue::from_static("*"));

    if (status.is_success() || status == StatusCode::NOT_FOUND)
        && !headers.contains_key(header::CACHE_CONTROL)
    {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(IMMUTABLE_CACHE),
        );
    }

    response
}

fn preflight_response() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::CACHE_CONTROL, IMMUTABLE_CACHE),
            (header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
        ],
    )
        .into_response()
}
