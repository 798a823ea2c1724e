//! Monotonic millisecond stamps.
//!
//! Depot prefixes every stored file with the epoch millisecond at which it was ingested:
//! `<stamp>-<original name>`. Wall-clock milliseconds alone are not unique: two uploads of the
//! same filename inside one millisecond would produce the same name and one would overwrite the
//! other.
//!
//! [`StampGenerator`] closes that gap. Each stamp it hands out is the current epoch millisecond
//! *or* one past the previous stamp, whichever is greater, so within a process every stamp is
//! strictly greater than the one before it. Stamps stay human readable and still sort by
//! ingestion time.
//!
//! ## Example
//!
//! ```
//! use depot_stamp::StampGenerator;
//!
//! let stamps = StampGenerator::new();
//! let first = stamps.next().unwrap();
//! let second = stamps.next().unwrap();
//! assert!(second > first);
//! ```

mod service;

pub use service::{Stamp, StampGenerator};

/// Error type for stamp operations.
#[derive(Debug, thiserror::Error)]
pub enum StampError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for stamp operations.
pub type StampResult<T> = Result<T, StampError>;
