use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a compile run outright.
///
/// Problems found in the sheets themselves are never errors; they are
/// collected as [`crate::Diagnostic`] values instead.
#[derive(Debug, Error)]
pub enum TablecError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A workbook could not be opened or one of its sheets could not be read.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// The configuration file is malformed.
    #[error("invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A worker thread panicked while processing a task.
    #[error("{phase} worker panicked on task {task}")]
    WorkerPanicked { phase: &'static str, task: usize },

    /// An output file or directory could not be written.
    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, TablecError>;
