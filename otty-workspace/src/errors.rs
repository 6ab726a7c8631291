use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted while reading or writing the workspace file, or when a
/// project path cannot be stored in it.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("workspace IO failed: {0}")]
    Io(#[from] io::Error),

    #[error("workspace JSON failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("project path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;
