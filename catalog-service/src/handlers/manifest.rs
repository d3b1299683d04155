use crate::startup::AppState;
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use service_core::error::AppError;
use tokio_util::io::ReaderStream;

/// Stream the stored manifest back unchanged.
pub async fn get_manifest(State(state): State<AppState>) -> Result<Response, AppError> {
    let object = state
        .storage
        .get(state.catalog.manifest_key())
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Manifest not found")))?;

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(ReaderStream::new(object.body)),
    )
        .into_response())
}
