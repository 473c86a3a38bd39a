//! Common regex patterns for bill and receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Money figure: "1,234.56", "1234.56", "12,50", "1,234.5" or a bare integer.
/// A one-digit tail is only read after a dot; "12,5" stays ambiguous.
pub const AMOUNT_NUMBER: &str = r"(\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:[.,]\d{2}|\.\d)?)";

/// Separator allowed between a label and its figure (": $", " ..... ", " USD ").
pub const LABEL_GAP: &str = r"[^\w\n]{0,12}(?:USD|KYD|CI|US)?[^\w\n]{0,4}";

const MONTHS: &str = "january|jan|february|feb|march|mar|april|apr|may|june|jun|july|jul|august|aug|september|sept|sep|october|oct|november|nov|december|dec";

fn labeled_amount(label: &str) -> Regex {
    Regex::new(&format!(r"(?i){}{}{}", label, LABEL_GAP, AMOUNT_NUMBER)).unwrap()
}

lazy_static! {
    // Amount labels, most specific first
    pub static ref AMOUNT_PATTERNS: Vec<(&'static str, Regex)> = vec![
        ("total_amount_due", labeled_amount(r"\btotal\s+amount\s+due\b")),
        ("amount_due", labeled_amount(r"\bamount\s+due\b")),
        ("balance_due", labeled_amount(r"\bbalance\s+due\b")),
        ("total_due", labeled_amount(r"\btotal\s+due\b")),
        ("amount_to_pay", labeled_amount(
            r"\b(?:please\s+pay|pay\s+this\s+amount|amount\s+to\s+pay|amount\s+payable)\b"
        )),
        ("new_balance", labeled_amount(r"\b(?:new|current|statement|account)\s+balance\b")),
        ("total_charges", labeled_amount(r"\btotal\s+(?:current\s+)?charges\b")),
        ("grand_total", labeled_amount(r"\bgrand\s+total\b")),
        ("total", labeled_amount(r"\btotal\b")),
        ("current_charges", labeled_amount(r"\bcurrent\s+charges\b")),
        ("balance", labeled_amount(r"\bbalance\b")),
        ("currency", Regex::new(&format!(r"\$[^\w\n]{{0,3}}{}", AMOUNT_NUMBER)).unwrap()),
    ];

    pub static ref SUBTOTAL: Regex = labeled_amount(r"\bsub[\s\-]?total\b");

    pub static ref TAX_AMOUNT: Regex = labeled_amount(
        r"\b(?:sales\s+)?(?:tax|vat|gst|hst)\b(?:\s*\(?\d{1,2}(?:\.\d+)?\s*%\)?)?"
    );

    pub static ref PREVIOUS_BALANCE: Regex = labeled_amount(
        r"\b(?:previous|prior|last)\s+(?:balance|bill(?:\s+amount)?|statement(?:\s+balance)?|amount\s+due)\b"
    );

    pub static ref CURRENT_CHARGES: Regex = labeled_amount(r"\b(?:total\s+)?current\s+charges\b");

    // Date shapes
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4})[/\-.](\d{1,2})[/\-.](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_MONTH_FIRST: Regex = Regex::new(&format!(
        r"(?i)\b({})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b",
        MONTHS
    )).unwrap();

    pub static ref DATE_DAY_FIRST: Regex = Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+({})\.?,?\s+(\d{{4}})\b",
        MONTHS
    )).unwrap();

    // Labeled dates, most specific first
    pub static ref DOCUMENT_DATE_LABELS: Vec<Regex> = vec![
        Regex::new(
            r"(?i)\b(?:invoice|bill|billing|statement|issue|print|transaction|purchase)\s+date\b"
        ).unwrap(),
        Regex::new(
            r"(?i)\bdate\s+(?:of\s+)?(?:invoice|issue|statement|bill|service)\b"
        ).unwrap(),
        Regex::new(r"(?i)\b(?:billing|service|statement)\s+period\b").unwrap(),
        Regex::new(r"(?i)\bdated?\b").unwrap(),
    ];

    pub static ref DUE_DATE_LABEL: Regex = Regex::new(
        r"(?i)\b(?:due\s+date|date\s+due|payment\s+due|please\s+pay\s+by|pay\s+by|due\s+by|due\s+on)\b"
    ).unwrap();

    // Vendor candidates; each stays on a single line
    pub static ref VENDOR_LABEL: Regex = Regex::new(
        r"(?im)^[^\S\n]*(?:billed\s+by|bill\s+from|from|vendor|merchant|payee|company|remit\s+(?:payment\s+)?to|make\s+checks\s+payable\s+to|pay\s+to)[^\S\n]*[:\-][^\S\n]*(.+?)[^\S\n]*$"
    ).unwrap();

    pub static ref CORPORATE_SUFFIX: Regex = Regex::new(
        r"\b([A-Z][A-Za-z0-9&'.\-]*(?:[^\S\n]+(?:&[^\S\n]+)?[A-Z][A-Za-z0-9&'.\-]*){0,4},?[^\S\n]+(?:Inc|LLC|L\.L\.C|Ltd|Corp|Corporation|Company|Co|Limited|Group|PLC|LLP)\b\.?)"
    ).unwrap();

    pub static ref CAPITALIZED_LINE: Regex = Regex::new(
        r"(?m)^[^\S\n]*([A-Z][A-Za-z&'\-]+(?:[^\S\n]+(?:&[^\S\n]+)?[A-Z][A-Za-z&'\-]+){1,4})[^\S\n]*$"
    ).unwrap();

    // Address shapes rejected as vendor names
    pub static ref STREET_ADDRESS: Regex = Regex::new(
        r"(?i)^\d+\s+.*\b(?:street|st|avenue|ave|road|rd|drive|dr|lane|ln|boulevard|blvd|way|court|ct|place|pl|highway|hwy|parkway|pkwy|circle|cir|terrace)\b"
    ).unwrap();

    pub static ref PO_BOX: Regex = Regex::new(r"(?i)\bp\.?\s*o\.?\s*box\b").unwrap();

    pub static ref ZIP_CODE: Regex = Regex::new(r"\b\d{5}(?:-\d{4})?\b").unwrap();

    pub static ref UNIT_MARKER: Regex = Regex::new(
        r"(?i)\b(?:suite|ste|apt|apartment|unit|floor)\b"
    ).unwrap();

    pub static ref CITY_STATE: Regex = Regex::new(r"^[A-Z][A-Za-z .]+,\s*[A-Z]{2}\b").unwrap();

    pub static ref LONG_DIGITS: Regex = Regex::new(r"\d{4,}").unwrap();

    // Account and contact metadata
    pub static ref ACCOUNT_NUMBER: Regex = Regex::new(
        r"(?i)\b(?:account|acct|policy|customer|member)\.?\s*(?:number|num|no|#)?\.?\s*[:#]?\s*([A-Z0-9][A-Z0-9\-]{3,24})\b"
    ).unwrap();

    pub static ref PHONE_LABELED: Regex = Regex::new(
        r"(?i)\b(?:phone|tel|telephone|call(?:\s+us)?|customer\s+service|contact)\b[^\d\n(+]{0,15}(\+?1?[\s.\-]?\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]?\d{4})"
    ).unwrap();

    pub static ref PHONE: Regex = Regex::new(
        r"(?:\+?1[\s.\-])?(?:\(\d{3}\)\s?|\b\d{3}[\s.\-])\d{3}[\s.\-]\d{4}\b"
    ).unwrap();

    pub static ref EMAIL: Regex = Regex::new(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"
    ).unwrap();

    pub static ref WEBSITE: Regex = Regex::new(
        r"(?i)\b(?:https?://)?(?:www\.)?[a-z0-9][a-z0-9\-]*(?:\.[a-z0-9\-]+)*\.(?:com|net|org|ky|io|co|us|biz|gov|info)\b(?:/[^\s]*)?"
    ).unwrap();

    pub static ref PLAN: Regex = Regex::new(
        r"(?im)\b(?:service\s+plan|rate\s+plan|plan|package|tariff|rate\s+schedule)\s*[:\-]\s*([^\n]{2,60}?)\s*$"
    ).unwrap();

    pub static ref USAGE_LABELED: Regex = Regex::new(
        r"(?i)\b(?:total\s+usage|data\s+used|usage|consumption|used)\b[^\d\n]{0,15}(\d[\d,]*(?:\.\d+)?\s*(?:kwh|gb|mb|tb|gallons|gal|minutes|mins|therms|ccf|m3)\b)"
    ).unwrap();

    pub static ref USAGE: Regex = Regex::new(
        r"(?i)\b(\d[\d,]*(?:\.\d+)?\s*(?:kwh|gb|mb|tb|gallons|therms|ccf|m3)\b)"
    ).unwrap();

    pub static ref BILLING_PERIOD: Regex = Regex::new(
        r"(?im)\b(?:billing|service|statement)\s+period\b\s*[:\-]?\s*([^\n]{4,60}?)\s*$"
    ).unwrap();

    // Receipt line items
    pub static ref ITEM_EXCLUSIONS: Regex = Regex::new(
        r"(?i)\b(?:total|subtotal|sub\s*total|tax|change|cash|tender(?:ed)?|visa|mastercard|amex|discover|debit|credit|card|balance|cashier|register|survey|thank|receipt|store\s*#|trans(?:action)?|approval|auth|savings|saved|points|member|phone|tel|www|http|refund|due|paid|payment|loyalty|rewards|coupon|items\s+sold)\b"
    ).unwrap();

    pub static ref ITEM_QTY_NAME_PRICE: Regex = Regex::new(
        r"^(\d{1,3})\s*[xX@]?\s+([A-Za-z][A-Za-z0-9 &'\-./%,]*?)\s+\$?(\d{1,4}[.,]\d{2})\s*[A-Za-z*]{0,2}$"
    ).unwrap();

    pub static ref ITEM_NAME_QTY_UNIT: Regex = Regex::new(
        r"^([A-Za-z][A-Za-z0-9 &'\-./%,]*?)\s+(\d{1,3})\s*[xX@]\s*\$?(\d{1,4}[.,]\d{2})(?:\s+\$?\d{1,4}[.,]\d{2})?\s*[A-Za-z*]{0,2}$"
    ).unwrap();

    pub static ref ITEM_NAME_CODE_PRICE: Regex = Regex::new(
        r"^([A-Za-z][A-Za-z0-9 &'\-./%,]*?)\s+\d{4,14}\s+\$?(\d{1,4}[.,]\d{2})\s*[A-Za-z*]{0,2}$"
    ).unwrap();

    pub static ref ITEM_NAME_SALE_PRICE: Regex = Regex::new(
        r"(?i)^([a-z][a-z0-9 &'\-./%,]*?)\s+(?:sale|special|promo|disc(?:ount)?|bogo|clearance|reg(?:ular)?)\s+\$?(\d{1,4}[.,]\d{2})\s*[a-z*]{0,2}$"
    ).unwrap();

    pub static ref ITEM_NAME_PRICE: Regex = Regex::new(
        r"^([A-Za-z][A-Za-z0-9 &'\-./%,]*?)\s+\$?(\d{1,4}[.,]\d{2})\s*(?:(?i:sale|special|promo)|[A-Za-z*]{1,2})?$"
    ).unwrap();

    pub static ref ITEM_FALLBACK: Regex = Regex::new(
        r"^(.+?)\s+\$?(\d{1,4}[.,]\d{2})\s*\S{0,3}$"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_patterns_compile_in_order() {
        let names: Vec<&str> = AMOUNT_PATTERNS.iter().map(|(n, _)| *n).collect();
        assert_eq!(names.first(), Some(&"total_amount_due"));
        assert_eq!(names.last(), Some(&"currency"));
    }

    #[test]
    fn test_label_gap_rejects_words() {
        let (_, total) = &AMOUNT_PATTERNS[8];
        assert!(total.is_match("TOTAL: $21.20"));
        assert!(!total.is_match("TOTAL SAVINGS 5.00"));
        assert!(!total.is_match("SUBTOTAL 20.00"));
    }

    #[test]
    fn test_due_label() {
        assert!(DUE_DATE_LABEL.is_match("Payment Due: 04/01/2024"));
        assert!(!DUE_DATE_LABEL.is_match("Invoice Date: 03/15/2024"));
    }
}
