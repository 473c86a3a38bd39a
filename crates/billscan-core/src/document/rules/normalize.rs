//! OCR text normalization.
//!
//! Fixes common glyph confusions using the neighbouring characters, then
//! cleans up whitespace. Pure string transform.

/// Normalize raw OCR text.
///
/// Empty or whitespace-only input is returned unchanged.
pub fn normalize_text(text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    let printable: String = text
        .replace("\r\n", "\n")
        .chars()
        .filter_map(|c| match c {
            '\n' => Some('\n'),
            '\t' | '\r' | '\u{00a0}' => Some(' '),
            c if c.is_control() => None,
            '\u{200b}' | '\u{feff}' => None,
            c => Some(c),
        })
        .collect();

    let mut lines = Vec::new();
    let mut previous_blank = true;

    for line in printable.lines() {
        let corrected = correct_glyphs(line);
        let collapsed = corrected.split_whitespace().collect::<Vec<_>>().join(" ");

        if collapsed.is_empty() {
            if !previous_blank {
                lines.push(String::new());
            }
            previous_blank = true;
        } else {
            lines.push(collapsed);
            previous_blank = false;
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Class {
    Digit,
    Upper,
    Lower,
    Other,
}

fn class_of(c: Option<char>) -> Class {
    match c {
        Some(c) if c.is_ascii_digit() => Class::Digit,
        Some(c) if c.is_uppercase() => Class::Upper,
        Some(c) if c.is_lowercase() => Class::Lower,
        _ => Class::Other,
    }
}

fn is_letter(class: Class) -> bool {
    matches!(class, Class::Upper | Class::Lower)
}

/// At least one neighbour is a digit and neither is a letter.
fn digit_context(prev: Class, next: Class) -> bool {
    (prev == Class::Digit || next == Class::Digit) && !is_letter(prev) && !is_letter(next)
}

/// Number of digits in the whitespace-delimited token around each character.
fn token_digit_counts(chars: &[char]) -> Vec<usize> {
    let mut counts = vec![0; chars.len()];
    let mut start = 0;

    while start < chars.len() {
        let end = chars[start..]
            .iter()
            .position(|c| c.is_whitespace())
            .map_or(chars.len(), |p| start + p);
        let digits = chars[start..end].iter().filter(|c| c.is_ascii_digit()).count();
        counts[start..end].fill(digits);
        start = end + 1;
    }

    counts
}

/// Fix glyph confusions on one line. Context is read from the original
/// characters so corrections never cascade.
///
/// Digits are only read as letters when they are the sole digit of their
/// token; "AB1CD2" is an identifier, "VER1ZON" a misread word.
fn correct_glyphs(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let token_digits = token_digit_counts(&chars);
    let mut out = String::with_capacity(line.len());

    for (i, &c) in chars.iter().enumerate() {
        let prev = class_of(i.checked_sub(1).map(|p| chars[p]));
        let next = class_of(chars.get(i + 1).copied());
        let lone_digit = token_digits[i] <= 1;
        let both_upper = lone_digit && prev == Class::Upper && next == Class::Upper;
        let both_lower = lone_digit && prev == Class::Lower && next == Class::Lower;

        let fixed = match c {
            '|' if is_letter(prev) || is_letter(next) => 'I',
            'O' | 'o' if digit_context(prev, next) => '0',
            'S' if digit_context(prev, next) => '5',
            'B' if digit_context(prev, next) => '8',
            'I' | 'l' if digit_context(prev, next) => '1',
            'l' if prev == Class::Upper && next == Class::Upper => 'I',
            '0' if both_upper => 'O',
            '0' if both_lower => 'o',
            '1' if both_upper => 'I',
            '1' if both_lower => 'l',
            '5' if both_upper => 'S',
            '8' if both_upper => 'B',
            other => other,
        };
        out.push(fixed);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_unchanged() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("   \n\t "), "   \n\t ");
    }

    #[test]
    fn test_digit_context_corrections() {
        assert_eq!(normalize_text("Total: $1O5.5O"), "Total: $105.50");
        assert_eq!(normalize_text("Amount 2S.B0"), "Amount 25.80");
        assert_eq!(normalize_text("Qty l2"), "Qty 12");
    }

    #[test]
    fn test_letter_context_corrections() {
        assert_eq!(normalize_text("VER1ZON W|RELESS"), "VERIZON WIRELESS");
        assert_eq!(normalize_text("SH0P"), "SHOP");
        assert_eq!(normalize_text("WlRELESS"), "WIRELESS");
        assert_eq!(normalize_text("g0od"), "good");
    }

    #[test]
    fn test_mixed_identifiers_kept() {
        assert_eq!(normalize_text("Account Number: AB1CD2"), "Account Number: AB1CD2");
        assert_eq!(normalize_text("Ref X5Y0Z"), "Ref X5Y0Z");
        assert_eq!(normalize_text("VER1ZON AB1CD2"), "VERIZON AB1CD2");
    }

    #[test]
    fn test_leaves_real_words_and_numbers() {
        let text = "Invoice Date: 03/15/2024\n12oz Coffee 5.99\nTO 5 STORES";
        assert_eq!(normalize_text(text), text);
    }

    #[test]
    fn test_table_separator_kept() {
        assert_eq!(normalize_text("Item | 4.99"), "Item | 4.99");
    }

    #[test]
    fn test_whitespace_cleanup() {
        let text = "  CUC  \t Ltd \r\n\n\n\nAccount:   123\u{0007}4 \n\n";
        assert_eq!(normalize_text(text), "CUC Ltd\n\nAccount: 1234");
    }

    #[test]
    fn test_idempotent_on_clean_text() {
        let once = normalize_text("Balance Due  $ 4O.00\n\n\nThank you");
        assert_eq!(normalize_text(&once), once);
    }
}
