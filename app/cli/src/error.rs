//! FILENAME: app/cli/src/error.rs

use std::path::PathBuf;

use dataset::ExportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Could not read selection file {path:?}: {source}")]
    SelectionFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid selection JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
