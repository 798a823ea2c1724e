//! # API REST
//!
//! REST API implementation for Depot.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, multipart uploads)
//! - Recording inbound requests in the shared request log
//!
//! Uses `api-shared` for wire types and the request log, and `depot_files` for storage.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
mod handlers;
mod request_logging;

use api_shared::{
    CatalogEntry, DeleteRes, FailureRes, HealthRes, RequestLog, RequestLogEntry, UploadForm,
    UploadRes, UploadedFile,
};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use depot_files::FilesService;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::{ConfigError, RestConfig};
pub use handlers::UPLOAD_FIELD;

/// Path of the request log endpoint; requests to it are not logged.
pub const LOG_PATH: &str = "/api/logs";

/// Application state shared across REST API handlers
///
/// Holds the storage service and the request log. Both are shared handles, so cloning the
/// state is cheap.
#[derive(Clone)]
pub struct AppState {
    pub files: Arc<FilesService>,
    pub request_log: RequestLog,
}

impl AppState {
    pub fn new(files: FilesService) -> Self {
        Self {
            files: Arc::new(files),
            request_log: RequestLog::new(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::upload,
        handlers::list_files,
        handlers::delete_file,
        handlers::retrieve_file,
        handlers::read_logs,
    ),
    components(schemas(
        HealthRes,
        UploadRes,
        UploadedFile,
        UploadForm,
        CatalogEntry,
        DeleteRes,
        FailureRes,
        RequestLogEntry,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router
///
/// Every request passes through the request-log middleware before dispatch. Upload bodies are
/// not size-limited.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/upload", post(handlers::upload))
        .route("/api/files", get(handlers::list_files))
        .route("/api/files/:stored_name", delete(handlers::delete_file))
        .route("/uploads/:stored_name", get(handlers::retrieve_file))
        .route(LOG_PATH, get(handlers::read_logs))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(
            state.request_log.clone(),
            request_logging::record_request,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
