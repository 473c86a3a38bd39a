//! Data models: output records, OCR input, and configuration.

pub mod config;
pub mod ocr;
pub mod record;
