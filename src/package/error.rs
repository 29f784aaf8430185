//! Error types for mddoc package operations

use crate::package::hooks::HookName;
use thiserror::Error;

/// Boxed error returned by hook listeners.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("Hook listener for '{hook}' failed: {source}")]
    HookListener {
        hook: HookName,
        #[source]
        source: BoxError,
    },

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Unknown hook name: {0}")]
    InvalidHookName(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PackageError {
    /// Whether the error came out of a hook listener rather than the archive itself.
    pub fn is_hook_failure(&self) -> bool {
        matches!(self, PackageError::HookListener { .. })
    }
}

impl From<zip::result::ZipError> for PackageError {
    fn from(err: zip::result::ZipError) -> Self {
        PackageError::CorruptArchive(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PackageError>;
