/// Error types for the rainfall series library
use thiserror::Error;

/// Main error type for rainfall series operations
#[derive(Error, Debug)]
pub enum DekadError {
    /// Input is missing an expected column
    #[error("Missing expected column: {0}")]
    MissingColumn(String),

    /// A measurement column name could not be parsed into window/kind tags
    #[error("Unrecognized measure column: {0}")]
    UnknownMeasure(String),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Date parsing failed
    #[error("Failed to parse date: {0}")]
    DateParse(String),

    /// Dates within a series group are not strictly increasing
    #[error("Dates not strictly increasing for {location_code} ({window}) at {date}")]
    NonMonotonicDates {
        location_code: String,
        window: String,
        date: chrono::NaiveDate,
    },

    /// A required filter left zero rows
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results using DekadError
pub type Result<T> = std::result::Result<T, DekadError>;
