//! Name cleanup shared by vendor and line item extraction.

use super::patterns::LONG_DIGITS;

/// Clean an extracted vendor or product name.
///
/// Drops embedded product codes and stray symbols, collapses whitespace, and
/// title-cases ALL-CAPS words longer than three letters (short ones such as
/// "CUC" or "AT&T" are usually acronyms).
pub fn clean_name(raw: &str) -> String {
    let without_codes = LONG_DIGITS.replace_all(raw, " ");

    let filtered: String = without_codes
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '&' | '\'' | '-' | '.' | '%') {
                c
            } else {
                ' '
            }
        })
        .collect();

    let words: Vec<String> = filtered
        .split_whitespace()
        .map(title_case_caps)
        .collect();

    words
        .join(" ")
        .trim_matches(|c: char| matches!(c, '-' | '.' | '&' | '\'' | ' '))
        .to_string()
}

fn title_case_caps(word: &str) -> String {
    let letters = word.chars().filter(|c| c.is_alphabetic()).count();
    let all_caps = letters > 0 && word.chars().all(|c| !c.is_lowercase());

    if !all_caps || letters <= 3 {
        return word.to_string();
    }

    let mut out = String::with_capacity(word.len());
    let mut first = true;
    for c in word.chars() {
        if c.is_alphabetic() {
            if first {
                out.extend(c.to_uppercase());
                first = false;
            } else {
                out.extend(c.to_lowercase());
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Whether a cleaned name is usable at all.
pub(crate) fn is_usable_name(name: &str) -> bool {
    name.chars().filter(|c| c.is_alphabetic()).count() >= 2
}
