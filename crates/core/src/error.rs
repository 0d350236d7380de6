use std::path::PathBuf;
use thiserror::Error;

/// Errors from parsing a `YYMM` period code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("period code must be 4 digits (YYMM), got {0:?}")]
    Malformed(String),

    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(u32),

    #[error("year {0} is outside 2000..=2099")]
    YearOutOfRange(i32),
}

/// Errors from loading snapshot documents off disk.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// IO error reading a document.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON deserialization error.
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
