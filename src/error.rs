//! Error taxonomy for source loading.
//!
//! Only the base source failing is fatal; every other [`SourceError`] is
//! converted into an empty contribution where it arises and logged, never
//! rethrown across component boundaries.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source file {path:?} not found")]
    NotFound { path: PathBuf },
    #[error("failed to read source file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse source file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to decode source file {path:?} as {encoding}")]
    Decode { path: PathBuf, encoding: String },
}
