//! Date extraction for bills and receipts.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::patterns::{
    DATE_DAY_FIRST, DATE_ISO, DATE_MONTH_FIRST, DATE_NUMERIC, DOCUMENT_DATE_LABELS,
    DUE_DATE_LABEL,
};
use super::{ExtractionMatch, FieldExtractor};

/// Confidence added when a document date is found.
const DOCUMENT_DATE_CONFIDENCE: f32 = 0.3;

/// Confidence added when a due date is found.
const DUE_DATE_CONFIDENCE: f32 = 0.2;

/// Finds every date-shaped substring, in text order.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        // MM/DD/YYYY, falling back to DD/MM/YYYY when the month is impossible
        for caps in DATE_NUMERIC.captures_iter(text) {
            let first: u32 = caps[1].parse().unwrap_or(0);
            let second: u32 = caps[2].parse().unwrap_or(0);
            let year = parse_year(&caps[3]);

            let date = NaiveDate::from_ymd_opt(year, first, second)
                .or_else(|| NaiveDate::from_ymd_opt(year, second, first));
            if let (Some(date), Some(m)) = (date, caps.get(0)) {
                results.push(
                    ExtractionMatch::new(date, 0.9, m.as_str()).with_position(m.start(), m.end()),
                );
            }
        }

        // YYYY-MM-DD
        for caps in DATE_ISO.captures_iter(text) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);

            let date = NaiveDate::from_ymd_opt(year, month, day);
            if let (Some(date), Some(m)) = (date, caps.get(0)) {
                results.push(
                    ExtractionMatch::new(date, 0.95, m.as_str()).with_position(m.start(), m.end()),
                );
            }
        }

        // "March 15, 2024"
        for caps in DATE_MONTH_FIRST.captures_iter(text) {
            let month = month_to_number(&caps[1]);
            let day: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);

            let date = NaiveDate::from_ymd_opt(year, month, day);
            if let (Some(date), Some(m)) = (date, caps.get(0)) {
                results.push(
                    ExtractionMatch::new(date, 0.95, m.as_str()).with_position(m.start(), m.end()),
                );
            }
        }

        // "15 March 2024"
        for caps in DATE_DAY_FIRST.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month = month_to_number(&caps[2]);
            let year: i32 = caps[3].parse().unwrap_or(0);

            let date = NaiveDate::from_ymd_opt(year, month, day);
            if let (Some(date), Some(m)) = (date, caps.get(0)) {
                results.push(
                    ExtractionMatch::new(date, 0.95, m.as_str()).with_position(m.start(), m.end()),
                );
            }
        }

        results.sort_by_key(|r| r.position.map(|(start, _)| start).unwrap_or(usize::MAX));
        results
    }
}

/// Extracted dates from a document.
#[derive(Debug, Clone, Default)]
pub struct DocumentDates {
    /// Statement, invoice or transaction date.
    pub document_date: Option<ExtractionMatch<NaiveDate>>,
    /// Payment due date.
    pub due_date: Option<ExtractionMatch<NaiveDate>>,
    /// Combined date confidence (0.0 - 1.0).
    pub confidence: f32,
}

/// Extract the document date and due date.
///
/// Document dates outside `window` (years) are rejected; they are usually
/// misread digits or phone/account numbers. Due dates are not range-checked.
pub fn extract_dates(text: &str, window: RangeInclusive<i32>) -> DocumentDates {
    let extractor = DateExtractor::new();
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let in_window = |d: &ExtractionMatch<NaiveDate>| window.contains(&d.value.year());

    let mut result = DocumentDates::default();

    // Labeled document dates, most specific label first
    'labels: for label in DOCUMENT_DATE_LABELS.iter() {
        for (i, line) in lines.iter().enumerate() {
            if DUE_DATE_LABEL.is_match(line) {
                continue;
            }
            let Some(m) = label.find(line) else {
                continue;
            };

            let found = first_date_after(&extractor, line, m.end(), lines.get(i + 1), &in_window);
            if let Some(date) = found {
                result.document_date = Some(date);
                break 'labels;
            }
        }
    }

    // Any date in range that is not on a due-date line
    if result.document_date.is_none() {
        result.document_date = lines
            .iter()
            .filter(|line| !DUE_DATE_LABEL.is_match(line))
            .flat_map(|line| extractor.extract_all(line))
            .find(|d| in_window(d));
    }

    let any_date = |_: &ExtractionMatch<NaiveDate>| true;
    for (i, line) in lines.iter().enumerate() {
        if let Some(m) = DUE_DATE_LABEL.find(line) {
            let found = first_date_after(&extractor, line, m.end(), lines.get(i + 1), &any_date);
            if found.is_some() {
                result.due_date = found;
                break;
            }
        }
    }

    if result.document_date.is_some() {
        result.confidence += DOCUMENT_DATE_CONFIDENCE;
    }
    if result.due_date.is_some() {
        result.confidence += DUE_DATE_CONFIDENCE;
    }
    result.confidence = result.confidence.min(1.0);

    debug!(
        "dates: document {:?}, due {:?}",
        result.document_date.as_ref().map(|d| d.value),
        result.due_date.as_ref().map(|d| d.value)
    );

    result
}

/// First acceptable date after a label, on the same line or the next one.
fn first_date_after(
    extractor: &DateExtractor,
    line: &str,
    offset: usize,
    next_line: Option<&&str>,
    accept: &dyn Fn(&ExtractionMatch<NaiveDate>) -> bool,
) -> Option<ExtractionMatch<NaiveDate>> {
    extractor
        .extract_all(&line[offset..])
        .into_iter()
        .find(|d| accept(d))
        .or_else(|| {
            next_line.and_then(|next| extractor.extract_all(next).into_iter().find(|d| accept(d)))
        })
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

fn month_to_number(month: &str) -> u32 {
    match month.to_lowercase().get(..3) {
        Some("jan") => 1,
        Some("feb") => 2,
        Some("mar") => 3,
        Some("apr") => 4,
        Some("may") => 5,
        Some("jun") => 6,
        Some("jul") => 7,
        Some("aug") => 8,
        Some("sep") => 9,
        Some("oct") => 10,
        Some("nov") => 11,
        Some("dec") => 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const WINDOW: RangeInclusive<i32> = 2021..=2025;

    #[test]
    fn test_extract_date_shapes() {
        let extractor = DateExtractor::new();

        assert_eq!(extractor.extract("03/15/2024").unwrap().value, ymd(2024, 3, 15));
        assert_eq!(extractor.extract("15/03/2024").unwrap().value, ymd(2024, 3, 15));
        assert_eq!(extractor.extract("2024-03-15").unwrap().value, ymd(2024, 3, 15));
        assert_eq!(extractor.extract("March 15th, 2024").unwrap().value, ymd(2024, 3, 15));
        assert_eq!(extractor.extract("Sept. 3 2024").unwrap().value, ymd(2024, 9, 3));
        assert_eq!(extractor.extract("15 Mar 2024").unwrap().value, ymd(2024, 3, 15));
        assert_eq!(extractor.extract("3-15-24").unwrap().value, ymd(2024, 3, 15));
    }

    #[test]
    fn test_extract_all_in_text_order() {
        let extractor = DateExtractor::new();
        let all = extractor.extract_all("Jan 5, 2024 then 2024-02-01 then 03/01/2024");
        let values: Vec<NaiveDate> = all.iter().map(|d| d.value).collect();
        assert_eq!(values, vec![ymd(2024, 1, 5), ymd(2024, 2, 1), ymd(2024, 3, 1)]);
    }

    #[test]
    fn test_labeled_dates() {
        let text = "ACME POWER\nDue Date: 04/10/2024\nStatement Date: 03/15/2024\nCall 555-123-4567";
        let dates = extract_dates(text, WINDOW);

        assert_eq!(dates.document_date.unwrap().value, ymd(2024, 3, 15));
        assert_eq!(dates.due_date.unwrap().value, ymd(2024, 4, 10));
        assert!((dates.confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_label_on_previous_line() {
        let text = "Invoice Date\nMarch 2, 2024";
        let dates = extract_dates(text, WINDOW);
        assert_eq!(dates.document_date.unwrap().value, ymd(2024, 3, 2));
    }

    #[test]
    fn test_rejects_out_of_window_years() {
        let text = "Date: 01/02/1999\nPrinted 2024-06-30";
        let dates = extract_dates(text, WINDOW);
        assert_eq!(dates.document_date.unwrap().value, ymd(2024, 6, 30));

        let dates = extract_dates("Date: 01/02/2031", WINDOW);
        assert!(dates.document_date.is_none());
        assert_eq!(dates.confidence, 0.0);
    }

    #[test]
    fn test_due_date_not_window_checked() {
        let dates = extract_dates("Pay by 12/01/2030", WINDOW);
        assert!(dates.document_date.is_none());
        assert_eq!(dates.due_date.unwrap().value, ymd(2030, 12, 1));
        assert!((dates.confidence - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_label_round_trip() {
        for date in [ymd(2021, 1, 1), ymd(2023, 7, 4), ymd(2024, 2, 29), ymd(2025, 12, 31)] {
            for format in ["%m/%d/%Y", "%Y-%m-%d", "%B %d, %Y", "%d %b %Y"] {
                let text = format!(
                    "Customer copy\nInvoice Date: {}\nThank you for your business",
                    date.format(format)
                );
                let found = extract_dates(&text, WINDOW).document_date.unwrap();
                assert_eq!(found.value, date, "format {}", format);
            }
        }
    }
}
