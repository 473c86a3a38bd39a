//! WASM bindings for bill and receipt OCR text parsing.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! OCR itself runs on the JavaScript side; these bindings take the recognized
//! text and return structured records.

use rust_decimal::prelude::ToPrimitive;
use wasm_bindgen::prelude::*;

use billscan_core::document::rules::{categorize_item, parse_amount as parse_decimal};
use billscan_core::{BillParser, DocumentParser, OcrOutput, ReceiptParser};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract bill data from OCR text.
#[wasm_bindgen]
pub fn parse_bill_text(text: &str) -> Result<JsValue, JsValue> {
    to_js(&billscan_core::parse_bill(text))
}

/// Extract receipt data from OCR text.
#[wasm_bindgen]
pub fn parse_receipt_text(text: &str) -> Result<JsValue, JsValue> {
    to_js(&billscan_core::parse_receipt(text))
}

/// Correct common OCR glyph confusions and collapse whitespace.
#[wasm_bindgen]
pub fn normalize(text: &str) -> String {
    billscan_core::normalize_text(text)
}

/// Parse a currency amount (e.g., "$1,234.56").
#[wasm_bindgen]
pub fn parse_amount(amount: &str) -> Option<f64> {
    parse_decimal(amount).and_then(|d| d.to_f64())
}

/// Grocery category label for a product name (e.g., "Produce").
#[wasm_bindgen]
pub fn item_category(name: &str) -> String {
    categorize_item(name).as_str().to_string()
}

/// Bill and receipt scanner class for browser use.
#[wasm_bindgen]
pub struct BillScanner {
    bills: BillParser,
    receipts: ReceiptParser,
}

#[wasm_bindgen]
impl BillScanner {
    /// Create a new scanner with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            bills: BillParser::new(),
            receipts: ReceiptParser::new(),
        }
    }

    /// Pin the year used to validate document dates.
    #[wasm_bindgen]
    pub fn set_reference_year(&mut self, year: i32) {
        let mut config = self.bills.config().clone();
        config.extraction.reference_year = Some(year);
        self.bills = BillParser::new().with_config(config.clone());
        self.receipts = ReceiptParser::new().with_config(config);
    }

    /// Configure the OCR error-correction pass.
    #[wasm_bindgen]
    pub fn set_normalize(&mut self, normalize: bool) {
        let mut config = self.bills.config().clone();
        config.extraction.normalize = normalize;
        self.bills = BillParser::new().with_config(config.clone());
        self.receipts = ReceiptParser::new().with_config(config);
    }

    /// Extract bill data from text.
    #[wasm_bindgen]
    pub fn parse_bill(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.bills.parse(text))
    }

    /// Extract receipt data from text.
    #[wasm_bindgen]
    pub fn parse_receipt(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.receipts.parse(text))
    }

    /// Extract bill data from OCR output JSON (`{"text": ..., "words": [...]}`).
    #[wasm_bindgen]
    pub fn parse_bill_ocr(&self, ocr_json: &str) -> Result<JsValue, JsValue> {
        let ocr = parse_ocr_json(ocr_json)?;
        to_js(&self.bills.parse_ocr(&ocr))
    }

    /// Extract receipt data from OCR output JSON.
    #[wasm_bindgen]
    pub fn parse_receipt_ocr(&self, ocr_json: &str) -> Result<JsValue, JsValue> {
        let ocr = parse_ocr_json(ocr_json)?;
        to_js(&self.receipts.parse_ocr(&ocr))
    }
}

impl Default for BillScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_ocr_json(ocr_json: &str) -> Result<OcrOutput, JsValue> {
    serde_json::from_str(ocr_json).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_parse_amount() {
        let amount = parse_amount("$1,234.56");
        assert!(amount.is_some());
        assert!((amount.unwrap() - 1234.56).abs() < 0.01);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("12.50"), Some(12.5));
        assert_eq!(parse_amount("0.00"), Some(0.0));
    }

    #[wasm_bindgen_test]
    fn test_normalize() {
        assert_eq!(normalize("TOTAL   DUE"), "TOTAL DUE");
    }

    #[wasm_bindgen_test]
    fn test_item_category() {
        assert_eq!(item_category("Bananas"), "Produce");
    }

    #[wasm_bindgen_test]
    fn test_scanner_parses_bill() {
        let mut scanner = BillScanner::new();
        scanner.set_reference_year(2024);
        let record = scanner.parse_bill("Verizon Wireless\nTotal Amount Due: $245.67");
        assert!(record.is_ok());
        assert!(scanner.parse_bill_ocr("not json").is_err());
    }
}
