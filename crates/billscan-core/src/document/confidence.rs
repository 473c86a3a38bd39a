//! Aggregation of per-field confidences into one document score.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::config::{BillWeights, ReceiptWeights};

/// Local results of the bill extractors that feed the overall score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillSignals {
    pub amount: f32,
    pub date: f32,
    pub vendor: f32,
    pub category: f32,
    /// Length of the normalized text in characters.
    pub text_length: usize,
    pub has_account_number: bool,
}

/// Weighted sum of the bill field confidences, capped at `weights.cap`.
pub fn bill_confidence(signals: &BillSignals, weights: &BillWeights) -> f32 {
    let mut confidence = weights.amount * signals.amount
        + weights.date * signals.date
        + weights.vendor * signals.vendor
        + weights.category * signals.category;

    confidence += if signals.text_length > weights.long_text_threshold {
        weights.long_text_bonus
    } else {
        weights.short_text_bonus
    };

    if signals.has_account_number {
        confidence += weights.account_bonus;
    }

    confidence.clamp(0.0, weights.cap)
}

/// Local results of the receipt extractors that feed the overall score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptSignals {
    pub store: f32,
    pub date_found: bool,
    pub total: f32,
    /// Bonus already earned by the accepted line items.
    pub item_bonus: f32,
    pub items_total: Decimal,
    /// Separately extracted receipt total, if any.
    pub total_amount: Option<Decimal>,
}

/// Receipt score: store, date and total strength plus line item bonuses,
/// capped at `weights.cap`.
pub fn receipt_confidence(signals: &ReceiptSignals, weights: &ReceiptWeights) -> f32 {
    let mut confidence = weights.store * signals.store + weights.total * signals.total;

    if signals.date_found {
        confidence += weights.date;
    }

    confidence += signals.item_bonus.min(weights.item_bonus_cap);

    let cross_checked = signals.total_amount.is_some_and(|total| {
        totals_agree(signals.items_total, total, weights.cross_check_tolerance)
    });
    if cross_checked {
        confidence += weights.cross_check_bonus;
    }

    confidence.clamp(0.0, weights.cap)
}

/// Whether the line item sum is within `tolerance` (relative) of the total.
pub fn totals_agree(items_total: Decimal, total: Decimal, tolerance: f32) -> bool {
    if total <= Decimal::ZERO || items_total <= Decimal::ZERO {
        return false;
    }

    ((items_total - total).abs() / total)
        .to_f32()
        .is_some_and(|ratio| ratio <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Weights are calibration constants; revisit these expectations if they
    // are retuned against a labeled corpus.
    #[test]
    fn test_bill_weights() {
        let weights = BillWeights::default();
        let signals = BillSignals {
            amount: 1.0,
            date: 0.3,
            vendor: 0.9,
            category: 1.0,
            text_length: 80,
            has_account_number: false,
        };

        let confidence = bill_confidence(&signals, &weights);
        assert!((confidence - 0.74).abs() < 1e-5);
    }

    #[test]
    fn test_bill_cap() {
        let signals = BillSignals {
            amount: 1.0,
            date: 1.0,
            vendor: 1.0,
            category: 1.0,
            text_length: 500,
            has_account_number: true,
        };
        assert_eq!(bill_confidence(&signals, &BillWeights::default()), 0.99);
    }

    #[test]
    fn test_empty_bill_gets_only_length_bonus() {
        let confidence = bill_confidence(&BillSignals::default(), &BillWeights::default());
        assert!((confidence - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_receipt_cross_check() {
        let weights = ReceiptWeights::default();
        let mut signals = ReceiptSignals {
            store: 0.9,
            date_found: true,
            total: 1.0,
            item_bonus: 0.06,
            items_total: Decimal::new(2000, 2),
            total_amount: Some(Decimal::new(2120, 2)),
        };

        let agreeing = receipt_confidence(&signals, &weights);
        assert!((agreeing - (0.225 + 0.15 + 0.25 + 0.06 + 0.1)).abs() < 1e-5);

        signals.items_total = Decimal::new(500, 2);
        let disagreeing = receipt_confidence(&signals, &weights);
        assert!((agreeing - disagreeing - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_receipt_cap() {
        let signals = ReceiptSignals {
            store: 1.0,
            date_found: true,
            total: 1.0,
            item_bonus: 1.0,
            items_total: Decimal::ONE,
            total_amount: Some(Decimal::ONE),
        };
        let weights = ReceiptWeights {
            store: 1.0,
            ..Default::default()
        };
        assert_eq!(receipt_confidence(&signals, &weights), 0.95);
    }

    #[test]
    fn test_totals_agree() {
        assert!(totals_agree(Decimal::new(90, 0), Decimal::new(100, 0), 0.2));
        assert!(totals_agree(Decimal::new(119, 0), Decimal::new(100, 0), 0.2));
        assert!(!totals_agree(Decimal::new(121, 0), Decimal::new(100, 0), 0.2));
        assert!(!totals_agree(Decimal::ZERO, Decimal::ZERO, 0.2));
    }
}
