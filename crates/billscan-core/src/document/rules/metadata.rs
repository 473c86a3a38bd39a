//! Account, contact and auxiliary figure extraction.
//!
//! Every field here is opportunistic: each sub-extractor runs on its own and
//! a miss simply leaves the field empty.

use regex::Regex;
use rust_decimal::Decimal;

use super::amounts::parse_amount;
use super::patterns::{
    ACCOUNT_NUMBER, BILLING_PERIOD, CURRENT_CHARGES, EMAIL, PHONE, PHONE_LABELED, PLAN,
    PREVIOUS_BALANCE, SUBTOTAL, TAX_AMOUNT, USAGE, USAGE_LABELED, WEBSITE,
};

/// Auxiliary fields found on a bill or receipt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillMetadata {
    pub account_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub tax_amount: Option<Decimal>,
    pub previous_balance: Option<Decimal>,
    pub current_charges: Option<Decimal>,
    pub subtotal: Option<Decimal>,
    pub plan: Option<String>,
    pub usage: Option<String>,
    pub billing_period: Option<String>,
}

/// Run every sub-extractor over the text.
pub fn extract_metadata(text: &str) -> BillMetadata {
    BillMetadata {
        account_number: extract_account_number(text),
        phone: extract_phone(text),
        email: extract_email(text),
        website: extract_website(text),
        tax_amount: labeled_figure(&TAX_AMOUNT, text),
        previous_balance: labeled_figure(&PREVIOUS_BALANCE, text),
        current_charges: labeled_figure(&CURRENT_CHARGES, text),
        subtotal: labeled_figure(&SUBTOTAL, text),
        plan: first_capture(&PLAN, text),
        usage: first_capture(&USAGE_LABELED, text).or_else(|| first_capture(&USAGE, text)),
        billing_period: first_capture(&BILLING_PERIOD, text),
    }
}

/// Account or policy number. The token must contain at least one digit so
/// that "Account Summary" does not yield "Summary".
pub fn extract_account_number(text: &str) -> Option<String> {
    ACCOUNT_NUMBER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('-'))
        .find(|token| token.chars().any(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

/// Phone number, preferring one printed next to a phone label.
pub fn extract_phone(text: &str) -> Option<String> {
    first_capture(&PHONE_LABELED, text)
        .or_else(|| PHONE.find(text).map(|m| m.as_str().trim().to_string()))
}

pub fn extract_email(text: &str) -> Option<String> {
    EMAIL.find(text).map(|m| m.as_str().to_lowercase())
}

/// Website or bare domain. Email addresses are removed first so their
/// domain part is not reported as a website.
pub fn extract_website(text: &str) -> Option<String> {
    let without_emails = EMAIL.replace_all(text, " ");
    WEBSITE
        .find(&without_emails)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ')']).to_lowercase())
}

fn labeled_figure(pattern: &Regex, text: &str) -> Option<Decimal> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| parse_amount(m.as_str()))
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    const UTILITY_BILL: &str = "CUC\n\
        Account Number: 1002-3345\n\
        Customer Service: (345) 949-5200\n\
        billing@cuc.ky   www.cuc-cayman.com\n\
        Billing Period: Feb 12 - Mar 12\n\
        Rate Plan: Residential Service\n\
        Total Usage 845 kWh\n\
        Previous Balance $150.25\n\
        Current Charges $212.40\n\
        Tax $8.10\n\
        Total Amount Due $220.50";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_extract_metadata() {
        let meta = extract_metadata(UTILITY_BILL);

        assert_eq!(meta.account_number.as_deref(), Some("1002-3345"));
        assert_eq!(meta.phone.as_deref(), Some("(345) 949-5200"));
        assert_eq!(meta.email.as_deref(), Some("billing@cuc.ky"));
        assert_eq!(meta.website.as_deref(), Some("www.cuc-cayman.com"));
        assert_eq!(meta.billing_period.as_deref(), Some("Feb 12 - Mar 12"));
        assert_eq!(meta.plan.as_deref(), Some("Residential Service"));
        assert_eq!(meta.usage.as_deref(), Some("845 kWh"));
        assert_eq!(meta.previous_balance, Some(dec("150.25")));
        assert_eq!(meta.current_charges, Some(dec("212.40")));
        assert_eq!(meta.tax_amount, Some(dec("8.10")));
        assert_eq!(meta.subtotal, None);
    }

    #[test]
    fn test_account_number_needs_digit() {
        assert_eq!(extract_account_number("Account Summary"), None);
        assert_eq!(
            extract_account_number("Account Summary\nAcct # 77120934").as_deref(),
            Some("77120934")
        );
        assert_eq!(
            extract_account_number("Policy No. GX-4471-09").as_deref(),
            Some("GX-4471-09")
        );
    }

    #[test]
    fn test_bare_phone() {
        assert_eq!(extract_phone("questions? 800-555-0199").as_deref(), Some("800-555-0199"));
        assert_eq!(extract_phone("no numbers"), None);
    }

    #[test]
    fn test_email_is_not_a_website() {
        assert_eq!(extract_website("Send to pay@example.com"), None);
        assert_eq!(
            extract_website("Visit https://example.com/billing.").as_deref(),
            Some("https://example.com/billing")
        );
    }

    #[test]
    fn test_sales_tax_with_rate() {
        let meta = extract_metadata("Subtotal 20.00\nSales Tax (6.25%) 1.25\nTotal 21.25");
        assert_eq!(meta.tax_amount, Some(dec("1.25")));
        assert_eq!(meta.subtotal, Some(dec("20.00")));
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(extract_metadata(""), BillMetadata::default());
    }
}
