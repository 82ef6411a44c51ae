// ── Propatch Atoms: Error Types ────────────────────────────────────────────
// Single canonical error enum for the patcher, built with `thiserror`.
//
// Every variant is terminal for the current run: nothing retries, and the
// only write happens after all checks have passed.

use std::path::PathBuf;
use thiserror::Error;

use super::constants::{PRO_STATUS_PATH, RUN_ORIGIN_HINT};

#[derive(Debug, Error)]
pub enum PatchError {
    /// The store file could not be opened or is not a database.
    #[error("Error opening database {}: {message}", .path.display())]
    OpenFailed { path: PathBuf, message: String },

    /// SQLite rejected a SELECT or UPDATE.
    #[error("Error executing query: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    /// The settings lookup did not return exactly one row with one column.
    #[error("Invalid data retrieved from the settings table ({rows} rows, {columns} columns). {hint}", hint = RUN_ORIGIN_HINT)]
    MalformedResultSet { rows: usize, columns: usize },

    /// The stored value is not JSON, or `proStatus` is not a string.
    #[error("Error parsing JSON data: {0}")]
    MalformedJson(String),

    /// The document lacks `additional` or `additional.proStatus`.
    #[error("Invalid data structure in the settings table: missing '{0}'")]
    MissingField(String),

    /// `proStatus` holds something other than free, test or pro.
    #[error("Invalid current '{path}' value: {0}", path = PRO_STATUS_PATH)]
    InvalidState(String),

    /// The operator cancelled the picker or no store could be found.
    #[error("No database file selected.")]
    NoStoreSelected,

    /// Filesystem or terminal I/O failure while locating the store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PatchError {
    pub fn open_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::OpenFailed { path: path.into(), message: message.into() }
    }

    /// Text shown to the operator through the notifier.
    pub fn operator_message(&self) -> String {
        self.to_string()
    }
}

impl From<serde_json::Error> for PatchError {
    fn from(e: serde_json::Error) -> Self {
        PatchError::MalformedJson(e.to_string())
    }
}

/// All patcher operations return this type.
pub type PatchResult<T> = Result<T, PatchError>;

impl From<PatchError> for String {
    fn from(e: PatchError) -> Self {
        e.to_string()
    }
}
