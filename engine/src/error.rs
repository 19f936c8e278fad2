use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV writer error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Settings format error: {source}")]
    SettingsFormatError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Spreadsheet export error: {source}")]
    XlsxError {
        #[from]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("Column {column} is out of range (table has {count} columns)")]
    ColumnOutOfRange { column: usize, count: usize },

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Row {row} is out of range (table has {count} rows)")]
    RowOutOfRange { row: usize, count: usize },

    #[error("No CSV table is loaded")]
    NoTableLoaded,

    #[error("Internal processing error: {0}")]
    ProcessingError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let err: EngineError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn test_column_out_of_range_message() {
        let err = EngineError::ColumnOutOfRange { column: 4, count: 2 };
        assert_eq!(err.to_string(), "Column 4 is out of range (table has 2 columns)");
    }
}
