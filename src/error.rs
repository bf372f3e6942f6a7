use std::path::PathBuf;

use arrow::error::ArrowError;
use thiserror::Error;

/// Fatal failures of a pipeline run. Field-level coercion problems never end up here.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("raw source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("raw source {} is not readable as delimited data: {source}", path.display())]
    SourceFormat {
        path: PathBuf,
        #[source]
        source: ArrowError,
    },

    #[error("raw source is missing expected columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("building output table failed: {0}")]
    Transform(#[from] ArrowError),

    #[error("writing {} failed: {source}", path.display())]
    SinkWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EtlError>;
