//! Depot File Storage
//!
//! This crate owns the storage directory: the single flat directory that holds every uploaded
//! file as one entry.
//!
//! ## Storage Model
//!
//! - Each upload becomes exactly one file named `<stamp>-<original name>`
//! - Stamps come from a monotonic generator, so names never collide within a process
//! - Files are immutable once written; there is no rename or in-place update
//! - The catalog is rebuilt from filenames and filesystem metadata on every listing;
//!   nothing else is persisted
//!
//! ```text
//! uploads/
//! ├── 1743033045755-cat.png
//! ├── 1743033045756-cat.png
//! └── 1743033051002-report.pdf
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use depot_files::{FilesService, OriginalName};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = FilesService::open_or_create(Path::new("uploads"))?;
//! let stored = service.add(&OriginalName::new("cat.png")?, b"not really a png")?;
//! assert_eq!(stored.original_name.as_str(), "cat.png");
//! # Ok(())
//! # }
//! ```

mod constants;
mod files;

pub use constants::{DEFAULT_UPLOAD_DIR, FALLBACK_CONTENT_TYPE};
pub use depot_types::{NameError, OriginalName, StoredName};
pub use files::{FilesService, IngestedFile, PendingFile, StoredBlob, StoredFile};

/// Errors that can occur during file operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Storage directory is missing, not a directory, or cannot be created
    #[error("Invalid storage directory: {0}")]
    InvalidStorageDirectory(String),

    /// Name cannot identify a single entry in the storage directory
    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),

    /// No entry with the requested stored name
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The storage directory or an entry in it could not be read
    #[error("Storage read error: {0}")]
    StorageRead(std::io::Error),

    /// An entry could not be created, written or removed
    #[error("Storage write error: {0}")]
    StorageWrite(std::io::Error),
}

/// Result type for file operations.
pub type FilesResult<T> = Result<T, FilesError>;
