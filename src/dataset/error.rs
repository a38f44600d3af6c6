//! Dataset error types

use thiserror::Error;

/// Errors raised while loading or reading a dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Reading a local file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fetching a remote table failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The CSV text could not be parsed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The table has no header row
    #[error("Dataset has no columns: {0}")]
    Empty(String),

    /// A referenced column does not exist
    #[error("Column not found: {0}")]
    MissingColumn(String),

    /// A cell could not be read as the requested type
    #[error("Column {column} row {row}: expected a number, found {found:?}")]
    TypeMismatch {
        column: String,
        row: usize,
        found: String,
    },
}

/// Result type alias for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatasetError::MissingColumn("gdpPercap".to_string());
        assert_eq!(err.to_string(), "Column not found: gdpPercap");

        let err = DatasetError::TypeMismatch {
            column: "year".to_string(),
            row: 3,
            found: "n/a".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Column year row 3: expected a number, found \"n/a\""
        );
    }
}
