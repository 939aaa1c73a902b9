use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by [`crate::store::TaskStore`] operations.
#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    /// No module with this id exists in the store.
    #[error("Module '{0}' not found")]
    ModuleNotFound(Uuid),

    /// No task with this id exists in the store.
    #[error("Task '{0}' not found")]
    TaskNotFound(Uuid),

    /// Input rejected before touching the store.
    #[error("{0}")]
    Validation(String),
}

/// Errors raised while reading or writing project and CSV files.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid project file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV header row lacks one of the title/start/end columns.
    #[error(
        "CSV is missing required columns. Found headers: {found:?}. \
         Need columns for: task title, start date, end date."
    )]
    MissingColumns { found: Vec<String> },

    /// Every data row was rejected (or there were none).
    #[error("No valid tasks found in CSV ({skipped} rows skipped)")]
    NoRows { skipped: usize },
}
