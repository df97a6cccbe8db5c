use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by image store operations.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    /// The upload is missing or its extension is not allowed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The owner cannot produce a filesystem-safe key.
    #[error("Identity error: {0}")]
    Identity(String),

    /// The requested image is not in the owner's directory.
    #[error("Image not found: {0}")]
    NotFound(String),

    /// A directory creation, write, rename or removal failed.
    #[error("storage IO error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),
}

impl ImageStoreError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}

impl From<config::ConfigError> for ImageStoreError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ImageStoreError>;
