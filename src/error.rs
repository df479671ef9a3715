//! Error type shared by the inventory library.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::RecordId;

/// Convenience alias used throughout the library.
pub type Result<T, E = InventoryError> = std::result::Result<T, E>;

/// Errors surfaced by inventory operations.
///
/// Malformed-but-present input (an unparseable stock value, a bad CSV row) is
/// never an error; it resolves to a sentinel or is counted and skipped. Only
/// structurally invalid documents and failed lookups end up here.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// CSV text without a header and at least one data line.
    #[error("CSV file has an invalid format: expected a header and at least one data row, found {lines} non-blank line(s)")]
    CsvFormat { lines: usize },

    /// CSV header without any recognizable column label.
    #[error("CSV file is missing the expected columns: {expected}")]
    MissingColumns { expected: String },

    /// Import source that is not a `.csv` file.
    #[error("Only CSV files can be imported: {}", .0.display())]
    NotCsv(PathBuf),

    /// Required record field left empty.
    #[error("{0} cannot be empty")]
    MissingField(&'static str),

    /// No record with the given id.
    #[error("No record with id {0}")]
    NotFound(RecordId),

    /// Decrement requested on a zero or unknown stock.
    #[error("Stock for {0} is zero or unknown")]
    StockUnavailable(RecordId),

    /// Export requested with no records to write.
    #[error("No records to export")]
    EmptyExport,

    /// Persisted record data that is not valid JSON.
    #[error("Stored record data is corrupt: {0}")]
    CorruptData(#[source] serde_json::Error),

    /// Failure in the SQLite backend.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InventoryError {
    /// Returns true for errors caused by user input rather than the environment.
    ///
    /// The CLI maps user errors to exit code 1 and everything else to 2.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::CsvFormat { .. }
                | Self::MissingColumns { .. }
                | Self::NotCsv(_)
                | Self::MissingField(_)
                | Self::NotFound(_)
                | Self::StockUnavailable(_)
                | Self::EmptyExport
        )
    }
}
