//! Configuration for the extraction pipeline.
//!
//! Scores, weights and caps below are empirical values carried over from
//! hand-tuning against real bills. They are exposed here so they can be
//! recalibrated against a labeled corpus without touching the extractors.

use std::path::Path;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{BillscanError, Result};

/// Main configuration for the billscan pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillscanConfig {
    /// General extraction settings.
    pub extraction: ExtractionConfig,

    /// Amount candidate scoring.
    pub amounts: AmountScoring,

    /// Bill confidence weights.
    pub bill: BillWeights,

    /// Receipt confidence weights and line item limits.
    pub receipt: ReceiptWeights,
}

/// General extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Run the OCR error-correction pass before extraction.
    pub normalize: bool,

    /// Documents shorter than this (after normalization) are rejected.
    pub min_text_length: usize,

    /// Year used to validate document dates (default: current year).
    pub reference_year: Option<i32>,

    /// Oldest accepted document year, relative to the reference year.
    pub date_years_back: i32,

    /// Newest accepted document year, relative to the reference year.
    pub date_years_forward: i32,

    /// OCR word confidence (0 - 100) counted as "confident".
    pub ocr_word_threshold: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            min_text_length: 10,
            reference_year: None,
            date_years_back: 3,
            date_years_forward: 1,
            ocr_word_threshold: 60.0,
        }
    }
}

impl ExtractionConfig {
    /// Reference year, falling back to the current local year.
    pub fn resolve_reference_year(&self) -> i32 {
        self.reference_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}

/// Priority adjustments for amount candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountScoring {
    /// Context mentions "total" or "amount due".
    pub total_bonus: i32,

    /// Context mentions "balance" or "pay".
    pub balance_bonus: i32,

    /// Context mentions "current charges".
    pub current_charges_bonus: i32,

    /// Number looks like a phone number with an implausible value.
    pub phone_penalty: i32,

    /// Value below 1.
    pub small_value_penalty: i32,

    /// Value above `large_value_threshold`.
    pub large_value_penalty: i32,

    pub large_value_threshold: i64,

    /// Confidence = min(priority / divisor, 1).
    pub confidence_divisor: f32,
}

impl Default for AmountScoring {
    fn default() -> Self {
        Self {
            total_bonus: 5,
            balance_bonus: 3,
            current_charges_bonus: 2,
            phone_penalty: 8,
            small_value_penalty: 5,
            large_value_penalty: 3,
            large_value_threshold: 50_000,
            confidence_divisor: 15.0,
        }
    }
}

/// Weights for combining bill field confidences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillWeights {
    pub amount: f32,
    pub date: f32,
    pub vendor: f32,
    pub category: f32,

    /// Flat bonus for text longer than `long_text_threshold`.
    pub long_text_bonus: f32,

    /// Flat bonus for shorter text.
    pub short_text_bonus: f32,

    pub long_text_threshold: usize,

    /// Bonus when an account number was found.
    pub account_bonus: f32,

    /// Upper bound for bill confidence.
    pub cap: f32,
}

impl Default for BillWeights {
    fn default() -> Self {
        Self {
            amount: 0.30,
            date: 0.20,
            vendor: 0.20,
            category: 0.15,
            long_text_bonus: 0.10,
            short_text_bonus: 0.05,
            long_text_threshold: 100,
            account_bonus: 0.05,
            cap: 0.99,
        }
    }
}

/// Weights for receipt confidence and line item limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptWeights {
    /// Multiplier for the store name confidence.
    pub store: f32,

    /// Flat contribution when a transaction date was found.
    pub date: f32,

    /// Multiplier for the total amount confidence.
    pub total: f32,

    /// Bonus per accepted line item.
    pub item_bonus: f32,

    /// Maximum combined line item bonus.
    pub item_bonus_cap: f32,

    /// Relative difference allowed between the item sum and the total.
    pub cross_check_tolerance: f32,

    /// Bonus when the item sum agrees with the total.
    pub cross_check_bonus: f32,

    /// Upper bound for receipt confidence.
    pub cap: f32,

    pub min_line_length: usize,
    pub max_line_length: usize,

    /// Items must be priced strictly below this.
    pub max_item_price: i64,

    pub max_items: usize,
}

impl Default for ReceiptWeights {
    fn default() -> Self {
        Self {
            store: 0.25,
            date: 0.15,
            total: 0.25,
            item_bonus: 0.02,
            item_bonus_cap: 0.20,
            cross_check_tolerance: 0.20,
            cross_check_bonus: 0.10,
            cap: 0.95,
            min_line_length: 3,
            max_line_length: 80,
            max_item_price: 1000,
            max_items: 25,
        }
    }
}

impl BillscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            BillscanError::Config(format!("{}: {}", path.display(), e))
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: BillscanConfig =
            serde_json::from_str(r#"{"amounts": {"total_bonus": 7}}"#).unwrap();

        assert_eq!(config.amounts.total_bonus, 7);
        assert_eq!(config.amounts.balance_bonus, 3);
        assert_eq!(config.bill, BillWeights::default());
        assert_eq!(config.extraction.min_text_length, 10);
    }

    #[test]
    fn test_reference_year_override() {
        let config = ExtractionConfig {
            reference_year: Some(2024),
            ..Default::default()
        };
        assert_eq!(config.resolve_reference_year(), 2024);
    }

    #[test]
    fn test_bill_weights_sum_below_cap() {
        // Calibration values; revisit if a labeled corpus becomes available.
        let w = BillWeights::default();
        let max = w.amount + w.date + w.vendor + w.category + w.long_text_bonus + w.account_bonus;
        assert!(max <= 1.0 + f32::EPSILON);
        assert!((w.cap - 0.99).abs() < f32::EPSILON);
    }
}
