use crate::models::StoredObject;
use crate::services::links::external_document_url;
use crate::startup::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use service_core::error::AppError;
use tokio_util::io::ReaderStream;

const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

fn object_response(key: &str, object: StoredObject) -> Response {
    let filename = key.rsplit('/').next().unwrap_or(key);
    let content_type = object
        .content_type
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    let disposition = format!("inline; filename=\"{}\"", filename.replace('"', "\\\""));

    let mut response = Body::from_stream(ReaderStream::new(object.body)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or(HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(object.meta.size));
    match HeaderValue::from_str(&disposition) {
        Ok(value) => {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
        Err(_) => {
            headers.insert(header::CONTENT_DISPOSITION, HeaderValue::from_static("inline"));
        }
    }

    response
}

/// Serve the object named by the request path. Volume PDFs missing from the
/// bucket redirect to the external document repository.
pub async fn serve_object(State(state): State<AppState>, uri: Uri) -> Result<Response, AppError> {
    let raw_path = uri.path().strip_prefix('/').unwrap_or(uri.path());
    let key = match urlencoding::decode(raw_path) {
        Ok(key) => key.into_owned(),
        Err(_) => return Ok(not_found()),
    };
    if key.is_empty() {
        return Ok(not_found());
    }

    if let Some(object) = state.storage.get(&key).await? {
        tracing::debug!(key = %key, size = object.meta.size, "Serving object");
        return Ok(object_response(&key, object));
    }

    if let Some(url) = external_document_url(&state.config.site.external_documents_url, raw_path)
    {
        tracing::info!(key = %key, location = %url, "Redirecting to external document");
        return Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response());
    }

    Ok(not_found())
}
