//! Request handlers for the REST API.

use crate::error::ApiError;
use crate::AppState;
use api_shared::{
    CatalogEntry, DeleteRes, FailureRes, HealthRes, HealthService, RequestLogEntry, UploadForm,
    UploadRes, UploadedFile,
};
use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, Path as AxumPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use depot_files::{FilesError, OriginalName, PendingFile, StoredName, FALLBACK_CONTENT_TYPE};
use tokio_util::io::ReaderStream;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
pub(crate) async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadRes),
        (status = 400, description = "Missing or malformed file part", body = FailureRes),
        (status = 500, description = "Storage write failed", body = FailureRes)
    )
)]
/// Store one uploaded file
///
/// Accepts a multipart body with exactly one part named `file`. The bytes are streamed to disk
/// verbatim under `<stamp>-<filename>`; other parts are ignored. A request that fails part-way
/// leaves no entry behind.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the body is not readable multipart,
/// - the `file` part is missing, repeated, or has no usable filename.
///
/// Returns `500 Internal Server Error` if the storage write fails.
#[axum::debug_handler]
pub(crate) async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadRes>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::MalformedRequest(e.body_text()))?;

    let mut part: Option<(PendingFile, Option<String>)> = None;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MalformedRequest(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        if part.is_some() {
            return Err(ApiError::MalformedRequest(format!(
                "Only one `{}` part is accepted per upload",
                UPLOAD_FIELD
            )));
        }

        let file_name = field.file_name().map(str::to_owned).ok_or_else(|| {
            ApiError::MalformedRequest(format!("The `{}` part has no filename", UPLOAD_FIELD))
        })?;
        let original_name = OriginalName::new(&file_name)
            .map_err(|e| ApiError::from_files(FilesError::InvalidName(e), "Invalid filename"))?;
        let content_type = field.content_type().map(str::to_owned);

        let mut pending = state
            .files
            .create(&original_name)
            .map_err(|e| ApiError::from_files(e, "Failed to store file"))?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::MalformedRequest(e.body_text()))?
        {
            pending
                .write_chunk(&chunk)
                .map_err(|e| ApiError::from_files(e, "Failed to store file"))?;
        }
        part = Some((pending, content_type));
    }

    let (pending, content_type) = part.ok_or_else(|| {
        ApiError::MalformedRequest(format!("Missing `{}` part", UPLOAD_FIELD))
    })?;
    let ingested = pending
        .finish()
        .map_err(|e| ApiError::from_files(e, "Failed to store file"))?;

    tracing::info!(
        "Stored {} ({} bytes)",
        ingested.stored_name,
        ingested.size_bytes
    );

    Ok(Json(UploadRes {
        success: true,
        file: UploadedFile {
            stored_name: ingested.stored_name.to_string(),
            original_name: ingested.original_name.to_string(),
            size_bytes: ingested.size_bytes,
            mimetype: content_type.unwrap_or_else(|| FALLBACK_CONTENT_TYPE.into()),
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/files",
    responses(
        (status = 200, description = "Catalog of stored files", body = [CatalogEntry]),
        (status = 500, description = "Storage directory unreadable", body = FailureRes)
    )
)]
/// List every stored file
///
/// Entries come back in directory order. Each `id` is the entry's position in this response
/// and is not stable across calls.
///
/// # Errors
/// Returns `500 Internal Server Error` if the storage directory cannot be read.
#[axum::debug_handler]
pub(crate) async fn list_files(
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    let catalog = state
        .files
        .list()
        .map_err(|e| ApiError::from_files(e, "Failed to list files"))?;

    Ok(Json(
        catalog
            .into_iter()
            .map(|file| CatalogEntry {
                id: file.id,
                stored_name: file.stored_name.to_string(),
                original_name: file.original_name,
                size_bytes: file.size_bytes,
                created_at: file.created_at.to_rfc3339(),
            })
            .collect(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/files/{stored_name}",
    params(("stored_name" = String, Path, description = "Stored name of the file")),
    responses(
        (status = 200, description = "File deleted", body = DeleteRes),
        (status = 404, description = "No such file", body = FailureRes),
        (status = 500, description = "Removal failed", body = FailureRes)
    )
)]
/// Permanently delete a stored file
///
/// # Errors
/// Returns `404 Not Found` if no file has this stored name, or `500 Internal Server Error` if
/// removal fails.
#[axum::debug_handler]
pub(crate) async fn delete_file(
    State(state): State<AppState>,
    AxumPath(stored_name): AxumPath<String>,
) -> Result<Json<DeleteRes>, ApiError> {
    let stored_name = StoredName::parse(&stored_name)
        .map_err(|_| ApiError::NotFound(format!("File not found: {}", stored_name)))?;

    state
        .files
        .remove(&stored_name)
        .map_err(|e| ApiError::from_files(e, "Failed to delete file"))?;

    tracing::info!("Deleted {}", stored_name);
    Ok(Json(DeleteRes { success: true }))
}

#[utoipa::path(
    get,
    path = "/uploads/{stored_name}",
    params(("stored_name" = String, Path, description = "Stored name of the file")),
    responses(
        (status = 200, description = "Raw file bytes"),
        (status = 404, description = "No such file")
    )
)]
/// Stream a stored file's bytes
///
/// The content type is inferred from the stored name's extension. Failures carry a status
/// code only.
#[axum::debug_handler]
pub(crate) async fn retrieve_file(
    State(state): State<AppState>,
    AxumPath(stored_name): AxumPath<String>,
) -> Result<Response, StatusCode> {
    let stored_name = StoredName::parse(&stored_name).map_err(|_| StatusCode::NOT_FOUND)?;

    let blob = match state.files.open(&stored_name) {
        Ok(blob) => blob,
        Err(FilesError::FileNotFound(_)) => return Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to open {}: {}", stored_name, e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let stream = ReaderStream::new(tokio::fs::File::from_std(blob.file));
    Ok((
        [
            (header::CONTENT_TYPE, blob.content_type),
            (header::CONTENT_LENGTH, blob.size_bytes.to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Recent requests, oldest first", body = [RequestLogEntry])
    )
)]
/// Read the request log
///
/// Requests to this endpoint are never themselves logged.
#[axum::debug_handler]
pub(crate) async fn read_logs(State(state): State<AppState>) -> Json<Vec<RequestLogEntry>> {
    Json(state.request_log.snapshot().await)
}
