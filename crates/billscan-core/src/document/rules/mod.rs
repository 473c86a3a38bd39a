//! Rule-based field extractors for bills and receipts.

pub mod amounts;
pub mod category;
pub mod dates;
pub mod line_items;
pub mod metadata;
pub mod names;
pub mod normalize;
pub mod patterns;
pub mod vendor;

pub use amounts::{AmountExtractor, extract_amount, parse_amount, score_candidate};
pub use category::{
    CategoryTable, ITEM_KEYWORDS, SERVICE_KEYWORDS, categorize_item, classify, classify_service,
    score_categories,
};
pub use dates::{DateExtractor, DocumentDates, extract_dates};
pub use line_items::{LineItemExtractor, LineItems};
pub use metadata::{BillMetadata, extract_metadata};
pub use names::clean_name;
pub use normalize::normalize_text;
pub use vendor::{KnownVendor, VendorExtractor, VendorStrategy};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the best value from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all candidate values, best first.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// An extracted value with a local confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence: confidence.clamp(0.0, 1.0),
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// A ranked guess produced by a single pattern match.
///
/// Lives only while one extractor runs; the winner is turned into an
/// [`ExtractionMatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<T> {
    pub value: T,
    /// Final priority after contextual adjustments.
    pub priority: i32,
    /// Name of the pattern that produced this candidate.
    pub pattern: &'static str,
    /// Matched substring.
    pub matched: String,
    /// Byte offset of the match.
    pub start: usize,
}

/// Whole-word, case-insensitive keyword occurrence count.
///
/// `haystack` must already be lowercase.
pub(crate) fn count_word_occurrences(haystack: &str, keyword: &str) -> usize {
    if keyword.is_empty() {
        return 0;
    }

    haystack
        .match_indices(keyword)
        .filter(|(start, _)| {
            let before = haystack[..*start].chars().next_back();
            let after = haystack[start + keyword.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_word_occurrences() {
        assert_eq!(count_word_occurrences("tax and taxi tax", "tax"), 2);
        assert_eq!(count_word_occurrences("internet, internet!", "internet"), 2);
        assert_eq!(count_word_occurrences("anything", ""), 0);
        assert_eq!(count_word_occurrences("high speed internet", "high speed"), 1);
    }

    #[test]
    fn test_match_confidence_is_clamped() {
        assert_eq!(ExtractionMatch::new(1, 1.7, "x").confidence, 1.0);
        assert_eq!(ExtractionMatch::new(1, -0.2, "x").confidence, 0.0);
    }
}
