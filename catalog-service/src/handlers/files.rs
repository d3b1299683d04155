use crate::dtos::{FileListResponse, FilePageResponse, FilesByKeysRequest, ListFilesParams};
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use service_core::error::AppError;

pub async fn list_files(
    State(state): State<AppState>,
    Query(params): Query<ListFilesParams>,
) -> Result<Json<FilePageResponse>, AppError> {
    let query = params.into_query();
    let page = state.catalog.list_page(&query).await.map_err(|e| {
        tracing::error!(prefix = %query.prefix, limit = query.limit, "Failed to list files: {}", e);
        e
    })?;

    Ok(Json(FilePageResponse::from(page)))
}

pub async fn all_files(State(state): State<AppState>) -> Result<Json<FileListResponse>, AppError> {
    let files = state.catalog.list_all().await.map_err(|e| {
        tracing::error!("Failed to list all files: {}", e);
        e
    })?;

    Ok(Json(FileListResponse::from(files)))
}

pub async fn files_by_keys(
    State(state): State<AppState>,
    Json(request): Json<FilesByKeysRequest>,
) -> Json<FileListResponse> {
    let keys = request.keys.unwrap_or_default();
    let files = state.catalog.lookup(&keys).await;

    tracing::debug!(
        requested = keys.len(),
        found = files.len(),
        "Looked up files by key"
    );

    Json(FileListResponse::from(files))
}
