use crate::config::SiteConfig;
use crate::dtos::PreviewParams;
use crate::services::links::thumbnail_key;
use crate::services::preview::preview_page;
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

const PREVIEW_CACHE: &str = "public, max-age=86400";

/// Origin thumbnails are linked from: the configured public origin, else the
/// origin the request came in on.
fn public_origin(site: &SiteConfig, headers: &HeaderMap) -> String {
    if let Some(origin) = &site.public_origin {
        return origin.clone();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");

    format!("{}://{}", scheme, host)
}

pub async fn og_preview(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PreviewParams>,
) -> Response {
    let Some(file) = params.file.filter(|f| !f.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing file parameter").into_response();
    };

    let site = &state.config.site;
    let thumbnail_url = format!("{}/{}", public_origin(site, &headers), thumbnail_key(&file));
    let page = preview_page(site, &file, &thumbnail_url);

    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, PREVIEW_CACHE),
        ],
        page,
    )
        .into_response()
}
