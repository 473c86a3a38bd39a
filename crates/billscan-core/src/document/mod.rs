//! Bill and receipt field extraction.

pub mod confidence;
mod parser;
pub mod rules;

pub use parser::{BillParser, ReceiptParser, parse_bill, parse_receipt};
pub use rules::normalize_text;

use crate::error::ExtractionError;
use crate::models::ocr::OcrOutput;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for document parsers.
///
/// Parsing never fails: missing fields are defaulted and reflected in the
/// record's confidence and warnings.
pub trait DocumentParser: Send + Sync {
    /// Record type produced by this parser.
    type Record;

    /// Parse a document from plain OCR text.
    fn parse(&self, text: &str) -> Self::Record;

    /// Parse a document from full OCR output. Word confidences are recorded
    /// as diagnostics only.
    fn parse_ocr(&self, ocr: &OcrOutput) -> Self::Record;
}

/// Reject text too short to extract anything meaningful.
pub fn ensure_extractable(text: &str, minimum: usize) -> Result<()> {
    let length = text.trim().chars().count();
    if length < minimum {
        return Err(ExtractionError::InsufficientText { length, minimum });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_extractable() {
        assert!(ensure_extractable("Total Due $12.00", 10).is_ok());
        assert_eq!(
            ensure_extractable("   hi   ", 10),
            Err(ExtractionError::InsufficientText { length: 2, minimum: 10 })
        );
        assert!(ensure_extractable("", 10).is_err());
    }
}
