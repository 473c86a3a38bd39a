//! Core library for bill and receipt OCR text parsing.
//!
//! This crate provides:
//! - OCR text normalization (glyph confusion and whitespace cleanup)
//! - Field extraction (amount, dates, vendor, service category, account and
//!   contact metadata, receipt line items)
//! - Confidence aggregation into one structured record per document
//!
//! The OCR step itself is out of scope: callers hand in plain text, optionally
//! with per-word confidences, and get back a fully populated record.

pub mod document;
pub mod error;
pub mod models;

pub use document::{
    BillParser, DocumentParser, ReceiptParser, normalize_text, parse_bill, parse_receipt,
};
pub use error::{BillscanError, ExtractionError, Result};
pub use models::config::BillscanConfig;
pub use models::ocr::{OcrOutput, OcrWord, WordStats};
pub use models::record::{
    ContactInfo, ExtractedBillRecord, ExtractedReceiptRecord, ExtractionMetadata, ItemCategory,
    ReceiptLineItem, ServiceCategory, ServiceDetails,
};
