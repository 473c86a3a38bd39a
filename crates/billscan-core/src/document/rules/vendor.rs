//! Vendor and store name extraction.
//!
//! There is no single reliable marker for the issuer of a bill, so the
//! extractor walks an ordered chain of strategies and stops at the first one
//! that produces a name:
//!
//! 1. known-entity lookup (high confidence)
//! 2. labeled and company-shaped candidates, filtered for addresses (moderate)
//! 3. the first plausible short line near the top of the page (low)

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::ExtractionMatch;
use super::count_word_occurrences;
use super::names::{clean_name, is_usable_name};
use super::patterns::{
    CAPITALIZED_LINE, CITY_STATE, CORPORATE_SUFFIX, LONG_DIGITS, PO_BOX, STREET_ADDRESS,
    UNIT_MARKER, VENDOR_LABEL, ZIP_CODE,
};

const KNOWN_ENTITY_CONFIDENCE: f32 = 0.9;
const PATTERN_CONFIDENCE: f32 = 0.6;
const POSITIONAL_CONFIDENCE: f32 = 0.4;

/// Words that show up on every bill and are never a vendor name.
const BILL_VOCABULARY: &[&str] = &[
    "date", "total", "tax", "due", "amount", "balance", "invoice", "statement", "account",
    "payment", "bill", "page", "customer", "subtotal", "charges", "number", "period", "summary",
    "receipt", "phone", "email", "fax", "thank", "service address", "billing address", "remit",
    "dear", "welcome",
];

/// A recognizable vendor and the spellings that identify it.
#[derive(Debug, Clone, Copy)]
pub struct KnownVendor {
    /// Canonical name reported to callers.
    pub name: &'static str,
    /// Whole-word spellings, matched case-insensitively.
    pub aliases: &'static [&'static str],
}

pub static KNOWN_VENDORS: &[KnownVendor] = &[
    // Utilities
    KnownVendor { name: "CUC", aliases: &["CUC", "Caribbean Utilities"] },
    KnownVendor { name: "Water Authority", aliases: &["Water Authority"] },
    KnownVendor { name: "Consolidated Water", aliases: &["Consolidated Water"] },
    KnownVendor { name: "Duke Energy", aliases: &["Duke Energy"] },
    KnownVendor { name: "PG&E", aliases: &["PG&E", "Pacific Gas and Electric"] },
    KnownVendor { name: "Con Edison", aliases: &["Con Edison", "ConEd"] },
    KnownVendor { name: "National Grid", aliases: &["National Grid"] },
    KnownVendor { name: "Florida Power & Light", aliases: &["Florida Power & Light", "FPL"] },
    // Telecom and internet
    KnownVendor { name: "Verizon", aliases: &["Verizon"] },
    KnownVendor { name: "AT&T", aliases: &["AT&T"] },
    KnownVendor { name: "T-Mobile", aliases: &["T-Mobile"] },
    KnownVendor { name: "Comcast", aliases: &["Comcast", "Xfinity"] },
    KnownVendor { name: "Spectrum", aliases: &["Charter Spectrum", "Spectrum Internet"] },
    KnownVendor { name: "Digicel", aliases: &["Digicel"] },
    KnownVendor { name: "C3", aliases: &["C3 Pure Fibre"] },
    KnownVendor { name: "Logic", aliases: &["Logic Communications"] },
    KnownVendor { name: "Flow", aliases: &["Flow Cayman", "Cable & Wireless"] },
    // Insurance
    KnownVendor { name: "GEICO", aliases: &["GEICO"] },
    KnownVendor { name: "State Farm", aliases: &["State Farm"] },
    KnownVendor { name: "Allstate", aliases: &["Allstate"] },
    KnownVendor { name: "Progressive", aliases: &["Progressive Insurance"] },
    // Software
    KnownVendor { name: "Microsoft", aliases: &["Microsoft"] },
    KnownVendor { name: "Adobe", aliases: &["Adobe"] },
    KnownVendor { name: "Amazon Web Services", aliases: &["Amazon Web Services", "AWS"] },
    KnownVendor { name: "Google", aliases: &["Google Workspace", "Google Cloud"] },
    // Retail
    KnownVendor { name: "Foster's", aliases: &["Foster's Food Fair", "Fosters Food Fair"] },
    KnownVendor { name: "Kirk Market", aliases: &["Kirk Market"] },
    KnownVendor { name: "Hurley's", aliases: &["Hurley's", "Hurleys"] },
    KnownVendor { name: "Cost-U-Less", aliases: &["Cost-U-Less", "Cost U Less"] },
    KnownVendor { name: "Walmart", aliases: &["Walmart", "Wal-Mart"] },
    KnownVendor { name: "Target", aliases: &["Target Store", "Target.com"] },
    KnownVendor { name: "Costco", aliases: &["Costco"] },
    KnownVendor { name: "Kroger", aliases: &["Kroger"] },
    KnownVendor { name: "Whole Foods", aliases: &["Whole Foods"] },
    KnownVendor { name: "Trader Joe's", aliases: &["Trader Joe's", "Trader Joes"] },
    KnownVendor { name: "Publix", aliases: &["Publix"] },
    KnownVendor { name: "Safeway", aliases: &["Safeway"] },
    KnownVendor { name: "CVS", aliases: &["CVS Pharmacy", "CVS"] },
    KnownVendor { name: "Walgreens", aliases: &["Walgreens"] },
    KnownVendor { name: "Staples", aliases: &["Staples Inc", "Staples.com"] },
    KnownVendor { name: "Office Depot", aliases: &["Office Depot", "OfficeMax"] },
    KnownVendor { name: "Home Depot", aliases: &["Home Depot"] },
];

lazy_static! {
    static ref KNOWN_VENDOR_PATTERNS: Vec<(Regex, &'static str)> = compile_vendors(KNOWN_VENDORS);
}

fn compile_vendors(vendors: &[KnownVendor]) -> Vec<(Regex, &'static str)> {
    vendors
        .iter()
        .flat_map(|v| {
            v.aliases.iter().map(move |alias| {
                let pattern = format!(r"(?i)(?:^|\W){}(?:\W|$)", regex::escape(alias));
                (Regex::new(&pattern).unwrap(), v.name)
            })
        })
        .collect()
}

/// One link of the vendor extraction chain.
pub trait VendorStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Try to find a vendor name. `lines` are the trimmed, non-empty lines.
    fn find(&self, text: &str, lines: &[&str]) -> Option<ExtractionMatch<String>>;
}

/// Tier 1: curated list of recognizable vendors.
pub struct KnownEntityStrategy {
    patterns: Vec<(Regex, &'static str)>,
}

impl KnownEntityStrategy {
    pub fn new() -> Self {
        Self {
            patterns: KNOWN_VENDOR_PATTERNS.clone(),
        }
    }

    /// Use a different vendor table.
    pub fn with_vendors(vendors: &[KnownVendor]) -> Self {
        Self {
            patterns: compile_vendors(vendors),
        }
    }
}

impl Default for KnownEntityStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl VendorStrategy for KnownEntityStrategy {
    fn name(&self) -> &'static str {
        "known_entity"
    }

    fn find(&self, text: &str, _lines: &[&str]) -> Option<ExtractionMatch<String>> {
        // Earliest mention wins; the issuer is usually printed at the top.
        self.patterns
            .iter()
            .filter_map(|(pattern, name)| pattern.find(text).map(|m| (m.start(), *name, m)))
            .min_by_key(|(start, _, _)| *start)
            .map(|(_, name, m)| {
                ExtractionMatch::new(name.to_string(), KNOWN_ENTITY_CONFIDENCE, m.as_str().trim())
                    .with_position(m.start(), m.end())
            })
    }
}

/// Tier 2: labeled vendor fields and company-shaped phrases.
pub struct PatternStrategy;

impl VendorStrategy for PatternStrategy {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn find(&self, text: &str, _lines: &[&str]) -> Option<ExtractionMatch<String>> {
        let labeled = VENDOR_LABEL.captures_iter(text).filter_map(|c| c.get(1));
        let corporate = CORPORATE_SUFFIX.captures_iter(text).filter_map(|c| c.get(1));
        let capitalized = CAPITALIZED_LINE.captures_iter(text).filter_map(|c| c.get(1));

        labeled
            .chain(corporate)
            .chain(capitalized)
            .filter(|m| !is_false_positive(m.as_str()))
            .find_map(|m| {
                let name = clean_name(m.as_str());
                is_usable_name(&name).then(|| {
                    ExtractionMatch::new(name, PATTERN_CONFIDENCE, m.as_str())
                        .with_position(m.start(), m.end())
                })
            })
    }
}

/// Tier 3: first plausible line among the first five.
pub struct PositionalStrategy;

impl VendorStrategy for PositionalStrategy {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn find(&self, _text: &str, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        lines
            .iter()
            .take(5)
            .filter(|line| (3..=40).contains(&line.chars().count()))
            .filter(|line| line.chars().next().is_some_and(char::is_alphabetic))
            .filter(|line| !LONG_DIGITS.is_match(line))
            .filter(|line| !contains_bill_vocabulary(line))
            .find_map(|line| {
                let name = clean_name(line);
                is_usable_name(&name)
                    .then(|| ExtractionMatch::new(name, POSITIONAL_CONFIDENCE, *line))
            })
    }
}

fn contains_bill_vocabulary(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    BILL_VOCABULARY
        .iter()
        .any(|word| count_word_occurrences(&lower, word) > 0)
}

/// Reject candidates that are numbers, bill labels or parts of an address.
pub fn is_false_positive(candidate: &str) -> bool {
    let trimmed = candidate.trim();

    trimmed.is_empty()
        || trimmed.chars().all(|c| !c.is_alphabetic())
        || contains_bill_vocabulary(trimmed)
        || STREET_ADDRESS.is_match(trimmed)
        || PO_BOX.is_match(trimmed)
        || ZIP_CODE.is_match(trimmed)
        || UNIT_MARKER.is_match(trimmed)
        || CITY_STATE.is_match(trimmed)
}

/// Vendor extractor: runs the strategy chain and falls back to a default name.
pub struct VendorExtractor {
    strategies: Vec<Box<dyn VendorStrategy>>,
    fallback: String,
}

impl VendorExtractor {
    /// Standard three-tier chain.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            strategies: vec![
                Box::new(KnownEntityStrategy::new()),
                Box::new(PatternStrategy),
                Box::new(PositionalStrategy),
            ],
            fallback: fallback.into(),
        }
    }

    /// Custom chain, tried in order.
    pub fn with_strategies(
        fallback: impl Into<String>,
        strategies: Vec<Box<dyn VendorStrategy>>,
    ) -> Self {
        Self {
            strategies,
            fallback: fallback.into(),
        }
    }

    /// Extract the vendor name. Never fails: the fallback name is returned
    /// with confidence 0 when every strategy misses.
    pub fn extract(&self, text: &str) -> ExtractionMatch<String> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        for strategy in &self.strategies {
            if let Some(found) = strategy.find(text, &lines) {
                debug!(
                    "vendor {:?} via {} (confidence {:.2})",
                    found.value,
                    strategy.name(),
                    found.confidence
                );
                return found;
            }
        }

        ExtractionMatch::new(self.fallback.clone(), 0.0, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::UNKNOWN_COMPANY;

    fn extract(text: &str) -> ExtractionMatch<String> {
        VendorExtractor::new(UNKNOWN_COMPANY).extract(text)
    }

    #[test]
    fn test_known_entity_in_noise() {
        let result = extract("@@ 123 x\nACCT 8842\nthanks for paying CUC, see you soon");
        assert_eq!(result.value, "CUC");
        assert!(result.confidence >= 0.8);

        let result = extract("Verizon Wireless\nTotal Amount Due: $245.67");
        assert_eq!(result.value, "Verizon");
    }

    #[test]
    fn test_known_entity_whole_word_only() {
        let result = KnownEntityStrategy::new().find("CUCUMBER 1.99", &[]);
        assert!(result.is_none());
    }

    #[test]
    fn test_earliest_known_entity_wins() {
        let result = extract("Comcast Business\nPay online or at any Walmart");
        assert_eq!(result.value, "Comcast");
    }

    #[test]
    fn test_labeled_vendor() {
        let result = extract("Statement\nBilled By: Island Plumbing Works\nTotal $80.00");
        assert_eq!(result.value, "Island Plumbing Works");
        assert!((result.confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_corporate_suffix_skips_address() {
        let text = "1450 Harbour Drive\nSuite 200\nBlue Iguana Consulting LLC\nInvoice total $400.00";
        let result = extract(text);
        assert_eq!(result.value, "Blue Iguana Consulting LLC");
    }

    #[test]
    fn test_pattern_candidates_stay_on_one_line() {
        let result = PatternStrategy.find("Harbour\nBlue Iguana Consulting LLC\n", &[]).unwrap();
        assert_eq!(result.value, "Blue Iguana Consulting LLC");

        let result = PatternStrategy
            .find("George Town\nIsland Plumbing Works Ltd\n", &[])
            .unwrap();
        assert_eq!(result.value, "Island Plumbing Works Ltd");

        let lines: Vec<&str> = CAPITALIZED_LINE
            .captures_iter("George Town\nIsland Plumbing Works\n")
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();
        assert_eq!(lines, vec!["George Town", "Island Plumbing Works"]);
    }

    #[test]
    fn test_false_positive_filter() {
        assert!(is_false_positive("12345"));
        assert!(is_false_positive("Total Due"));
        assert!(is_false_positive("123 Main Street"));
        assert!(is_false_positive("P.O. Box 38"));
        assert!(is_false_positive("Springfield, IL"));
        assert!(is_false_positive("Suite 4"));
        assert!(is_false_positive("Denver CO 80202"));
        assert!(!is_false_positive("Sunrise Dental Group"));
    }

    #[test]
    fn test_positional_fallback() {
        let text = "sunny side bakery\n14 Main St\nBread 4.00";
        let result = extract(text);
        assert_eq!(result.value, "sunny side bakery");
        assert!((result.confidence - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_company() {
        let result = extract("0000 1111\n$5.00");
        assert_eq!(result.value, "Unknown Company");
        assert_eq!(result.confidence, 0.0);

        assert_eq!(extract("").value, "Unknown Company");
    }

    #[test]
    fn test_custom_chain() {
        let extractor = VendorExtractor::with_strategies(
            "Unknown Store",
            vec![Box::new(KnownEntityStrategy::with_vendors(&[KnownVendor {
                name: "Corner Shop",
                aliases: &["CORNER SHOP"],
            }]))],
        );
        assert_eq!(extractor.extract("corner shop #12").value, "Corner Shop");
        assert_eq!(extractor.extract("Verizon").value, "Unknown Store");
    }
}
