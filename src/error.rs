use std::io;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Crate-wide error type
// ---------------------------------------------------------------------------

/// Errors raised while loading a restaurant table or the explorer config.
///
/// Filtering and ranking never fail; every variant here comes from I/O,
/// decoding, or validation of input files.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// A cell could not be decoded. Fatal to the whole load.
    #[error("row {row}: malformed '{column}' value: {message}")]
    DataFormat {
        row: usize,
        column: &'static str,
        message: String,
    },

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ExplorerError {
    pub(crate) fn data_format(row: usize, column: &'static str, message: impl Into<String>) -> Self {
        ExplorerError::DataFormat {
            row,
            column,
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ExplorerError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
