//! Error types for the billscan-core library.

use thiserror::Error;

/// Main error type for the billscan library.
#[derive(Error, Debug)]
pub enum BillscanError {
    /// Document extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to document field extraction.
///
/// Parsers never return these to callers; they are turned into a defaulted
/// record plus a warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Text is too short to extract anything meaningful.
    #[error("insufficient text: {length} characters (minimum {minimum})")]
    InsufficientText { length: usize, minimum: usize },

    /// Failed to parse a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },
}

/// Result type for the billscan library.
pub type Result<T> = std::result::Result<T, BillscanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ExtractionError::InsufficientText { length: 3, minimum: 10 };
        assert_eq!(err.to_string(), "insufficient text: 3 characters (minimum 10)");

        let wrapped: BillscanError = err.into();
        assert!(wrapped.to_string().starts_with("extraction error:"));
    }
}
