use thiserror::Error;

/// Load-time failures. Both variants are fatal: the dashboard cannot start
/// without a structurally sound dataset.
#[derive(Error, Debug)]
pub enum DataError {
    /// Source file missing, unreadable, or not matching the expected schema
    #[error("dataset unavailable ({origin}): {reason}")]
    DataUnavailable { origin: String, reason: String },

    /// A year column whose name does not yield a year
    #[error("malformed year column: {0:?}")]
    MalformedColumn(String),
}

impl DataError {
    pub fn unavailable(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        DataError::DataUnavailable {
            origin: origin.into(),
            reason: reason.into(),
        }
    }
}

/// Failures while writing exported tables. Reported to the user; the
/// session keeps running.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}
