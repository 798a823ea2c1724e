//! REST server configuration.
//!
//! Resolved once at process startup and passed into the server. The resolver takes the raw
//! environment values as arguments instead of reading the environment itself, so request
//! handling never touches process-wide state and tests can exercise it directly.

use depot_files::DEFAULT_UPLOAD_DIR;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Listen address used when `DEPOT_REST_ADDR` is unset.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid listen address '{value}': {source}")]
    InvalidAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("upload directory cannot be empty")]
    EmptyUploadDir,
}

/// REST server configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct RestConfig {
    rest_addr: SocketAddr,
    upload_dir: PathBuf,
}

impl RestConfig {
    /// Resolve configuration from raw environment values.
    ///
    /// # Arguments
    /// * `rest_addr` - value of `DEPOT_REST_ADDR`, if set
    /// * `upload_dir` - value of `DEPOT_UPLOAD_DIR`, if set
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the address does not parse or the upload directory is empty.
    pub fn from_env_values(
        rest_addr: Option<String>,
        upload_dir: Option<String>,
    ) -> Result<Self, ConfigError> {
        let rest_addr = rest_addr.unwrap_or_else(|| DEFAULT_REST_ADDR.into());
        let rest_addr = rest_addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidAddress {
                value: rest_addr.clone(),
                source,
            })?;

        let upload_dir = upload_dir.unwrap_or_else(|| DEFAULT_UPLOAD_DIR.into());
        if upload_dir.trim().is_empty() {
            return Err(ConfigError::EmptyUploadDir);
        }

        Ok(Self {
            rest_addr,
            upload_dir: PathBuf::from(upload_dir),
        })
    }

    pub fn rest_addr(&self) -> SocketAddr {
        self.rest_addr
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }
}
