//! Receipt line item extraction.

use regex::Regex;
use rust_decimal::Decimal;
use tracing::trace;

use super::amounts::parse_amount;
use super::category::categorize_item;
use super::names::{clean_name, is_usable_name};
use super::patterns::{
    ITEM_EXCLUSIONS, ITEM_FALLBACK, ITEM_NAME_CODE_PRICE, ITEM_NAME_PRICE, ITEM_NAME_QTY_UNIT,
    ITEM_NAME_SALE_PRICE, ITEM_QTY_NAME_PRICE,
};
use crate::models::config::ReceiptWeights;
use crate::models::record::ReceiptLineItem;

/// Letters above which an all-caps line without digits is treated as a header.
const HEADER_MIN_LETTERS: usize = 15;

/// How a line item shape encodes quantity and price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// qty, name, line price
    QtyNamePrice,
    /// name, qty, unit price
    NameQtyUnit,
    /// name, price
    NamePrice,
    /// any text ending in a price
    Fallback,
}

/// Accepted line items plus their confidence contribution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItems {
    /// Deduplicated items, most expensive first.
    pub items: Vec<ReceiptLineItem>,
    /// Additive confidence bonus for the number of accepted items.
    pub confidence_bonus: f32,
}

/// A parsed line and whether it came from the catch-all shape.
struct ParsedLine {
    item: ReceiptLineItem,
    fallback: bool,
}

/// Line item extractor for receipts.
pub struct LineItemExtractor {
    weights: ReceiptWeights,
    shapes: Vec<(Shape, &'static Regex)>,
}

impl LineItemExtractor {
    pub fn new() -> Self {
        Self {
            weights: ReceiptWeights::default(),
            shapes: vec![
                (Shape::QtyNamePrice, &*ITEM_QTY_NAME_PRICE),
                (Shape::NameQtyUnit, &*ITEM_NAME_QTY_UNIT),
                (Shape::NamePrice, &*ITEM_NAME_CODE_PRICE),
                (Shape::NamePrice, &*ITEM_NAME_SALE_PRICE),
                (Shape::NamePrice, &*ITEM_NAME_PRICE),
                (Shape::Fallback, &*ITEM_FALLBACK),
            ],
        }
    }

    /// Use custom limits and bonuses.
    pub fn with_weights(mut self, weights: ReceiptWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Extract line items from normalized receipt text.
    pub fn extract(&self, text: &str) -> LineItems {
        let mut items: Vec<ParsedLine> = Vec::new();

        for parsed in text.lines().filter_map(|line| self.parse_line(line)) {
            let key = parsed.item.name.to_lowercase();
            match items.iter_mut().find(|p| p.item.name.to_lowercase() == key) {
                // A named shape beats an earlier catch-all match
                Some(existing) if existing.fallback && !parsed.fallback => *existing = parsed,
                Some(_) => {}
                None => items.push(parsed),
            }
        }

        let mut items: Vec<ReceiptLineItem> = items.into_iter().map(|p| p.item).collect();
        items.sort_by(|a, b| b.price.cmp(&a.price));
        items.truncate(self.weights.max_items);

        let confidence_bonus =
            (items.len() as f32 * self.weights.item_bonus).min(self.weights.item_bonus_cap);

        LineItems {
            items,
            confidence_bonus,
        }
    }

    /// Parse a single receipt line into an item.
    pub fn parse(&self, line: &str) -> Option<ReceiptLineItem> {
        self.parse_line(line).map(|p| p.item)
    }

    fn parse_line(&self, line: &str) -> Option<ParsedLine> {
        let line = line.trim();
        if self.is_rejected(line) {
            return None;
        }

        for (shape, pattern) in &self.shapes {
            let Some(caps) = pattern.captures(line) else {
                continue;
            };

            let (raw_name, quantity, price) = match shape {
                Shape::QtyNamePrice => {
                    let quantity: u32 = caps[1].parse().unwrap_or(1);
                    (caps.get(2)?.as_str(), quantity, parse_amount(&caps[3])?)
                }
                Shape::NameQtyUnit => {
                    let quantity: u32 = caps[2].parse().unwrap_or(1);
                    let unit = parse_amount(&caps[3])?;
                    (caps.get(1)?.as_str(), quantity, unit * Decimal::from(quantity.max(1)))
                }
                Shape::NamePrice | Shape::Fallback => {
                    (caps.get(1)?.as_str(), 1, parse_amount(&caps[2])?)
                }
            };

            if price <= Decimal::ZERO || price >= Decimal::from(self.weights.max_item_price) {
                trace!("item price {} out of range on {:?}", price, line);
                return None;
            }

            let name = clean_name(raw_name);
            if !is_usable_name(&name) {
                return None;
            }

            let category = categorize_item(&name);
            return Some(ParsedLine {
                item: ReceiptLineItem {
                    name,
                    quantity: quantity.max(1),
                    price,
                    category,
                },
                fallback: *shape == Shape::Fallback,
            });
        }

        None
    }

    fn is_rejected(&self, line: &str) -> bool {
        let length = line.chars().count();
        if length < self.weights.min_line_length || length > self.weights.max_line_length {
            return true;
        }

        if ITEM_EXCLUSIONS.is_match(line) {
            return true;
        }

        // Digit and punctuation runs: card numbers, timestamps, barcodes
        if !line.chars().any(char::is_alphabetic) {
            return true;
        }

        is_header(line)
    }
}

impl Default for LineItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn is_header(line: &str) -> bool {
    let letters = line.chars().filter(|c| c.is_alphabetic()).count();
    letters > HEADER_MIN_LETTERS
        && !line.chars().any(|c| c.is_ascii_digit())
        && !line.chars().any(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::ItemCategory;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_qty_name_price() {
        let result = LineItemExtractor::new().extract("2 Apples 4.99");

        assert_eq!(result.items.len(), 1);
        let item = &result.items[0];
        assert_eq!(item.name, "Apples");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.price, dec("4.99"));
        assert_eq!(item.category, ItemCategory::Produce);
    }

    #[test]
    fn test_unit_price_is_multiplied() {
        let item = LineItemExtractor::new().parse("Bananas 3 @ 0.59").unwrap();
        assert_eq!(item.quantity, 3);
        assert_eq!(item.price, dec("1.77"));
    }

    #[test]
    fn test_product_code_is_skipped() {
        let item = LineItemExtractor::new().parse("ORGANIC BANANAS 4011 2.38").unwrap();
        assert_eq!(item.name, "Organic Bananas");
        assert_eq!(item.price, dec("2.38"));
        assert_eq!(item.category, ItemCategory::Produce);
    }

    #[test]
    fn test_trailing_flags_and_sale_labels() {
        let extractor = LineItemExtractor::new();
        assert_eq!(extractor.parse("Whole Milk 3.49 F").unwrap().name, "Whole Milk");
        assert_eq!(extractor.parse("Coffee Beans SALE 8.99").unwrap().price, dec("8.99"));
    }

    #[test]
    fn test_rejected_lines() {
        let extractor = LineItemExtractor::new();
        for line in [
            "TOTAL 21.20",
            "Subtotal 19.99",
            "VISA ************1234",
            "12/03/2024 14:22",
            "WELCOME TO FRESH MARKET GROCERS",
            "ab",
            "Change Due 0.80",
            "Free Sample 0.00",
            "Television 1299.99",
        ] {
            assert!(extractor.parse(line).is_none(), "{}", line);
        }
    }

    #[test]
    fn test_duplicate_names_collapsed() {
        let result = LineItemExtractor::new().extract("Milk 3.49\nBread 2.50\nMILK 3.49");
        let names: Vec<&str> = result.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Milk", "Bread"]);
    }

    #[test]
    fn test_named_shape_replaces_fallback() {
        let result = LineItemExtractor::new().extract("*Eggs 2.99\nEggs 3.19");
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].price, dec("3.19"));
    }

    #[test]
    fn test_sorted_capped_and_bonus() {
        let text: String = (0..30u32)
            .map(|i| {
                let suffix: String =
                    [(b'a' + (i / 26) as u8) as char, (b'a' + (i % 26) as u8) as char]
                        .iter()
                        .collect();
                format!("Thing {} {}.50\n", suffix, i + 1)
            })
            .collect();

        let result = LineItemExtractor::new().extract(&text);
        assert_eq!(result.items.len(), 25);
        assert_eq!(result.items[0].price, dec("30.50"));
        assert!(result.items.windows(2).all(|w| w[0].price >= w[1].price));
        assert!((result.confidence_bonus - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(LineItemExtractor::new().extract(""), LineItems::default());
    }
}
