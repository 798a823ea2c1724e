//! Storage constants.

/// Storage directory used when none is configured.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// How many fresh stamps ingestion draws before giving up on a name that keeps colliding
/// with entries already on disk.
pub const MAX_NAME_ATTEMPTS: usize = 16;

/// Content type reported for names with no recognised extension.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
