//! JSON wire types for the REST API.
//!
//! Every JSON-returning operation carries a `success` flag; failures carry a human-readable
//! `error` instead of a payload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Descriptor of a freshly ingested file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// On-disk name; use it to retrieve or delete the file
    pub stored_name: String,
    pub original_name: String,
    pub size_bytes: u64,
    /// Content type declared by the client for the uploaded part
    pub mimetype: String,
}

/// Successful upload response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadRes {
    pub success: bool,
    pub file: UploadedFile,
}

/// Multipart form accepted by the upload endpoint (documentation only).
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// The file to store; exactly one part named `file`
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// One entry of a catalog listing.
///
/// `id` is the entry's position within this response only; it is not a stable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: usize,
    pub stored_name: String,
    pub original_name: String,
    pub size_bytes: u64,
    /// RFC 3339 UTC timestamp
    pub created_at: String,
}

/// Successful deletion response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteRes {
    pub success: bool,
}

/// Failure response for every JSON-returning operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FailureRes {
    pub success: bool,
    pub error: String,
}

impl FailureRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
