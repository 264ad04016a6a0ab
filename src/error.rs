//! Error kinds for the sort engine (spec §7).
//!
//! All non-argument errors collapse to a single line on standard output
//! (a preserved legacy quirk, not stderr) and are fatal for the file being
//! processed; the orchestrator does not continue on to subsequent files.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RecsortError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid date format {pattern:?}: {reason}")]
    InvalidDateFormat { pattern: String, reason: String },

    #[error("invalid date value {value:?} for pattern {pattern:?}")]
    InvalidDateValue { value: String, pattern: String },

    #[error("invalid field spec {spec:?}: {reason}")]
    InvalidFieldSpec { spec: String, reason: String },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "numeric value {value:?} overflows the mantissa width for {precision:?} precision"
    )]
    ValueOverflow { value: String, precision: crate::config::Precision },

    #[error(
        "numeric value {value:?} overflows the exponent width for {precision:?} precision"
    )]
    ExponentOverflow { value: String, precision: crate::config::Precision },

    #[error("external sort of {index_path:?} failed with status {status}")]
    SortFailed { index_path: PathBuf, status: i32 },
}

pub type Result<T> = std::result::Result<T, RecsortError>;

/// Attaches a path to an I/O error, the way `uucore::error::FromIo` attaches
/// context to bare `io::Error`s before they are shown to the user.
pub trait IoContext<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| RecsortError::Io {
            path: path.into(),
            source,
        })
    }
}
