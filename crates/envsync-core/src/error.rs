//! Error types for envsync

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for envsync
#[derive(Error, Debug)]
pub enum EnvSyncError {
    #[error("Template not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("Store not found and creation was declined: {}", .0.display())]
    StoreMissing(PathBuf),

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Parse error in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid key {0:?}: expected a letter or '_' followed by letters, digits, '_' or '.'")]
    InvalidKey(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnvSyncError {
    /// True for errors that must stop the process before settings are trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EnvSyncError::TemplateMissing(_) | EnvSyncError::StoreMissing(_)
        )
    }
}

/// Result type alias for envsync operations
pub type Result<T> = std::result::Result<T, EnvSyncError>;
