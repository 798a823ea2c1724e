//! # API Shared
//!
//! Shared definitions for the Depot HTTP API.
//!
//! Contains:
//! - Wire types (`wire` module) serialised as camelCase JSON and described for OpenAPI
//! - Shared services like `HealthService`
//! - The bounded request log (`RequestLog`)
//!
//! Used by `api-rest`.

pub mod health;
pub mod request_log;
pub mod wire;

pub use health::HealthService;
pub use request_log::{RequestLog, RequestLogEntry, REQUEST_LOG_CAPACITY, UNKNOWN_USER_AGENT};
pub use wire::*;
