//! Bill and receipt parsers: normalization, field extraction and assembly.

use std::ops::RangeInclusive;
use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::confidence::{BillSignals, ReceiptSignals, bill_confidence, receipt_confidence};
use super::rules::{
    LineItemExtractor, VendorExtractor, classify_service, extract_amount, extract_dates,
    extract_metadata, normalize_text,
};
use super::{DocumentParser, ensure_extractable};
use crate::models::config::BillscanConfig;
use crate::models::ocr::OcrOutput;
use crate::models::record::{
    ContactInfo, ExtractedBillRecord, ExtractedReceiptRecord, ExtractionMetadata,
    ServiceDetails, UNKNOWN_COMPANY, UNKNOWN_STORE,
};

/// Parser for utility, telecom and service bills.
pub struct BillParser {
    config: BillscanConfig,
    vendors: VendorExtractor,
}

impl BillParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self {
            config: BillscanConfig::default(),
            vendors: VendorExtractor::new(UNKNOWN_COMPANY),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: BillscanConfig) -> Self {
        self.config = config;
        self
    }

    /// Pin the year used to validate document dates.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.config.extraction.reference_year = Some(year);
        self
    }

    pub fn config(&self) -> &BillscanConfig {
        &self.config
    }
}

impl Default for BillParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for BillParser {
    type Record = ExtractedBillRecord;

    fn parse(&self, text: &str) -> ExtractedBillRecord {
        let start = Instant::now();
        info!("Parsing bill from {} characters of text", text.len());

        let text = prepare(text, &self.config);
        if let Err(e) = ensure_extractable(&text, self.config.extraction.min_text_length) {
            warn!("Rejecting bill: {}", e);
            let mut record = ExtractedBillRecord::default();
            record.metadata.warnings.push(e.to_string());
            return record;
        }

        let mut warnings = Vec::new();

        let amount = extract_amount(&text, &self.config.amounts);
        if amount.is_none() {
            warnings.push("Could not extract amount".to_string());
        }

        let dates = extract_dates(&text, date_window(&self.config));
        if dates.document_date.is_none() {
            warnings.push("Could not extract document date".to_string());
        }

        let vendor = self.vendors.extract(&text);
        if vendor.confidence == 0.0 {
            warnings.push("Could not extract vendor".to_string());
        }

        let vendor_hint = (vendor.confidence > 0.0).then_some(vendor.value.as_str());
        let category = classify_service(&text, vendor_hint);

        let meta = extract_metadata(&text);

        let signals = BillSignals {
            amount: amount.as_ref().map_or(0.0, |a| a.confidence),
            date: dates.confidence,
            vendor: vendor.confidence,
            category: category.confidence,
            text_length: text.chars().count(),
            has_account_number: meta.account_number.is_some(),
        };
        let confidence = bill_confidence(&signals, &self.config.bill);

        let metadata = ExtractionMetadata {
            field_confidence: [
                ("amount", signals.amount),
                ("date", signals.date),
                ("vendor", signals.vendor),
                ("category", signals.category),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
            warnings,
            ocr: None,
        };

        let record = ExtractedBillRecord {
            vendor_name: vendor.value,
            amount: amount.map_or(Decimal::ZERO, |a| a.value),
            document_date: dates.document_date.map(|d| d.value),
            due_date: dates.due_date.map(|d| d.value),
            category: category.value,
            account_number: meta.account_number,
            tax_amount: meta.tax_amount,
            previous_balance: meta.previous_balance,
            current_charges: meta.current_charges,
            contact: ContactInfo {
                phone: meta.phone,
                email: meta.email,
                website: meta.website,
            },
            service: ServiceDetails {
                plan: meta.plan,
                usage: meta.usage,
                billing_period: meta.billing_period,
            },
            confidence,
            metadata,
        };

        debug!(
            "Extracted bill from {} ({}) with confidence {:.2} in {:?}",
            record.vendor_name,
            record.category,
            record.confidence,
            start.elapsed()
        );

        record
    }

    fn parse_ocr(&self, ocr: &OcrOutput) -> ExtractedBillRecord {
        let mut record = self.parse(&ocr.text);
        record.metadata.ocr = ocr.word_stats(self.config.extraction.ocr_word_threshold);
        record
    }
}

/// Parser for retail receipts.
pub struct ReceiptParser {
    config: BillscanConfig,
    stores: VendorExtractor,
    line_items: LineItemExtractor,
}

impl ReceiptParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::default().with_config(BillscanConfig::default())
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: BillscanConfig) -> Self {
        self.line_items = LineItemExtractor::new().with_weights(config.receipt.clone());
        self.config = config;
        self
    }

    /// Pin the year used to validate transaction dates.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.config.extraction.reference_year = Some(year);
        self
    }

    pub fn config(&self) -> &BillscanConfig {
        &self.config
    }
}

impl Default for ReceiptParser {
    fn default() -> Self {
        Self {
            config: BillscanConfig::default(),
            stores: VendorExtractor::new(UNKNOWN_STORE),
            line_items: LineItemExtractor::new(),
        }
    }
}

impl DocumentParser for ReceiptParser {
    type Record = ExtractedReceiptRecord;

    fn parse(&self, text: &str) -> ExtractedReceiptRecord {
        let start = Instant::now();
        info!("Parsing receipt from {} characters of text", text.len());

        let text = prepare(text, &self.config);
        if let Err(e) = ensure_extractable(&text, self.config.extraction.min_text_length) {
            warn!("Rejecting receipt: {}", e);
            let mut record = ExtractedReceiptRecord::default();
            record.metadata.warnings.push(e.to_string());
            return record;
        }

        let mut warnings = Vec::new();

        let store = self.stores.extract(&text);
        if store.confidence == 0.0 {
            warnings.push("Could not extract store name".to_string());
        }

        let dates = extract_dates(&text, date_window(&self.config));
        if dates.document_date.is_none() {
            warnings.push("Could not extract transaction date".to_string());
        }

        let total = extract_amount(&text, &self.config.amounts);
        if total.is_none() {
            warnings.push("Could not extract total".to_string());
        }

        let line_items = self.line_items.extract(&text);
        if line_items.items.is_empty() {
            warnings.push("Could not extract line items".to_string());
        }

        let meta = extract_metadata(&text);
        let items_total: Decimal = line_items.items.iter().map(|i| i.price).sum();

        let signals = ReceiptSignals {
            store: store.confidence,
            date_found: dates.document_date.is_some(),
            total: total.as_ref().map_or(0.0, |t| t.confidence),
            item_bonus: line_items.confidence_bonus,
            items_total,
            total_amount: total.as_ref().map(|t| t.value),
        };
        let confidence = receipt_confidence(&signals, &self.config.receipt);

        let metadata = ExtractionMetadata {
            field_confidence: [
                ("amount", signals.total),
                ("date", dates.confidence),
                ("vendor", signals.store),
                ("items", signals.item_bonus),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
            warnings,
            ocr: None,
        };

        let record = ExtractedReceiptRecord {
            store_name: store.value,
            transaction_date: dates.document_date.map(|d| d.value),
            total_amount: total.map_or(Decimal::ZERO, |t| t.value),
            subtotal: meta.subtotal,
            tax_amount: meta.tax_amount,
            items: line_items.items,
            confidence,
            metadata,
        };

        debug!(
            "Extracted receipt from {} with {} items, confidence {:.2} in {:?}",
            record.store_name,
            record.items.len(),
            record.confidence,
            start.elapsed()
        );

        record
    }

    fn parse_ocr(&self, ocr: &OcrOutput) -> ExtractedReceiptRecord {
        let mut record = self.parse(&ocr.text);
        record.metadata.ocr = ocr.word_stats(self.config.extraction.ocr_word_threshold);
        record
    }
}

/// Parse a bill with default settings.
pub fn parse_bill(text: &str) -> ExtractedBillRecord {
    BillParser::new().parse(text)
}

/// Parse a receipt with default settings.
pub fn parse_receipt(text: &str) -> ExtractedReceiptRecord {
    ReceiptParser::new().parse(text)
}

fn prepare(text: &str, config: &BillscanConfig) -> String {
    if config.extraction.normalize {
        normalize_text(text)
    } else {
        text.to_string()
    }
}

fn date_window(config: &BillscanConfig) -> RangeInclusive<i32> {
    let year = config.extraction.resolve_reference_year();
    (year - config.extraction.date_years_back)..=(year + config.extraction.date_years_forward)
}
