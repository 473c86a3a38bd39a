//! Amount extraction with context-aware candidate ranking.
//!
//! Bills usually print several money figures (subtotal, tax, previous
//! balance, total), so every labeled match becomes a candidate and the
//! highest-priority one wins instead of the first one found.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::patterns::{AMOUNT_PATTERNS, DATE_ISO, DATE_NUMERIC};
use super::{Candidate, ExtractionMatch, FieldExtractor};
use crate::models::config::AmountScoring;

/// Amount field extractor.
pub struct AmountExtractor {
    patterns: Vec<(&'static str, Regex)>,
    scoring: AmountScoring,
}

impl AmountExtractor {
    pub fn new() -> Self {
        Self {
            patterns: AMOUNT_PATTERNS.clone(),
            scoring: AmountScoring::default(),
        }
    }

    /// Use custom priority adjustments.
    pub fn with_scoring(mut self, scoring: AmountScoring) -> Self {
        self.scoring = scoring;
        self
    }

    /// Replace the ordered pattern list. Earlier patterns get higher base
    /// priority.
    pub fn with_patterns(mut self, patterns: Vec<(&'static str, Regex)>) -> Self {
        self.patterns = patterns;
        self
    }

    /// Collect every candidate, sorted by priority (stable, so ties keep
    /// pattern order).
    pub fn candidates(&self, text: &str) -> Vec<Candidate<Decimal>> {
        let total = self.patterns.len() as i32;
        let mut candidates = Vec::new();

        let date_spans: Vec<(usize, usize)> = DATE_NUMERIC
            .find_iter(text)
            .chain(DATE_ISO.find_iter(text))
            .map(|m| (m.start(), m.end()))
            .collect();

        for (rank, (name, pattern)) in self.patterns.iter().enumerate() {
            let base = total - rank as i32;

            for caps in pattern.captures_iter(text) {
                let (Some(full), Some(number)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };

                if is_date_fragment(text, number.end())
                    || overlaps(&date_spans, number.start(), number.end())
                {
                    continue;
                }

                let Some(value) = parse_amount(number.as_str()) else {
                    continue;
                };

                let priority =
                    score_candidate(base, full.as_str(), number.as_str(), value, &self.scoring);
                trace!("amount candidate {} via {} (priority {})", value, name, priority);

                candidates.push(Candidate {
                    value,
                    priority,
                    pattern: name,
                    matched: full.as_str().to_string(),
                    start: full.start(),
                });
            }
        }

        candidates.sort_by(|a, b| b.priority.cmp(&a.priority));
        candidates
    }

    fn to_match(&self, candidate: Candidate<Decimal>) -> ExtractionMatch<Decimal> {
        let confidence = candidate.priority as f32 / self.scoring.confidence_divisor;
        let end = candidate.start + candidate.matched.len();
        ExtractionMatch::new(candidate.value, confidence.min(1.0), candidate.matched)
            .with_position(candidate.start, end)
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.candidates(text)
            .into_iter()
            .map(|c| self.to_match(c))
            .collect()
    }
}

/// Compute the final priority of an amount candidate.
///
/// `context` is the whole matched substring (label plus figure), `raw` the
/// figure as printed.
pub fn score_candidate(
    base: i32,
    context: &str,
    raw: &str,
    value: Decimal,
    scoring: &AmountScoring,
) -> i32 {
    let context = context.to_lowercase();
    let mut priority = base;

    if context.contains("total") || context.contains("amount due") {
        priority += scoring.total_bonus;
    }
    if context.contains("balance") || context.contains("pay") {
        priority += scoring.balance_bonus;
    }
    if context.contains("current charges") {
        priority += scoring.current_charges_bonus;
    }

    let threshold = Decimal::from(scoring.large_value_threshold);
    let digits = raw.chars().filter(|c| c.is_ascii_digit()).count();
    if digits >= 10 && value > threshold {
        priority -= scoring.phone_penalty;
    }
    if value < Decimal::ONE {
        priority -= scoring.small_value_penalty;
    }
    if value > threshold {
        priority -= scoring.large_value_penalty;
    }

    priority
}

/// Pick the best amount. `None` when no amount-shaped text was found.
pub fn extract_amount(text: &str, scoring: &AmountScoring) -> Option<ExtractionMatch<Decimal>> {
    let best = AmountExtractor::new()
        .with_scoring(scoring.clone())
        .extract(text);

    if let Some(best) = &best {
        debug!("amount {} (confidence {:.2}) from {:?}", best.value, best.confidence, best.source);
    }

    best
}

/// The figure is really the start of a date such as "03/15/2024".
fn is_date_fragment(text: &str, end: usize) -> bool {
    let mut rest = text[end..].chars();
    matches!(
        (rest.next(), rest.next()),
        (Some('/' | '-'), Some(c)) if c.is_ascii_digit()
    )
}

/// The figure lies inside a full date match ("04.15.2024", "2024-04-15").
fn overlaps(spans: &[(usize, usize)], start: usize, end: usize) -> bool {
    spans.iter().any(|&(s, e)| start < e && s < end)
}

/// Parse an amount in US ("1,234.56") or European ("1.234,56") style.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(c), None) if cleaned.len() - c == 3 => cleaned.replace(',', "."),
        (Some(_), None) => cleaned.replace(',', ""),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}
