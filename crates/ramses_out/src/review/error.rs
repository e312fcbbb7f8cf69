//! Error types for the review delivery core

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Review error type
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Project root is not readable: {}", .0.display())]
    ProjectRootUnreadable(PathBuf),

    #[error("Destination is not writable: {}: {source}", .path.display())]
    DestinationUnwritable { path: PathBuf, source: io::Error },

    #[error("Failed to write marker {}: {source}", .path.display())]
    MarkerWrite { path: PathBuf, source: io::Error },

    #[error("Could not lock history log: {}", .0.display())]
    HistoryLock(PathBuf),

    #[error("Home directory could not be determined")]
    NoHomeDir,

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Filename parse failure. Non-fatal: the scanner records these as skips.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing '_S_' separator in '{0}'")]
    MissingSeparator(String),

    #[error("missing shot or step token in '{0}'")]
    MissingTokens(String),

    #[error("empty {component} component in '{name}'")]
    EmptyComponent { name: String, component: &'static str },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ReviewError>;
