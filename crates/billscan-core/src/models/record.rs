//! Structured records produced from bill and receipt text.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ocr::WordStats;
use crate::error::ExtractionError;

/// Vendor name used when no vendor could be extracted from a bill.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// Store name used when no store could be extracted from a receipt.
pub const UNKNOWN_STORE: &str = "Unknown Store";

/// Result of parsing a bill or invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedBillRecord {
    /// Vendor or company that issued the bill.
    pub vendor_name: String,

    /// Amount due.
    pub amount: Decimal,

    /// Statement or invoice date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_date: Option<NaiveDate>,

    /// Payment due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Service category.
    pub category: ServiceCategory,

    /// Account or policy number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,

    /// Tax or VAT amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<Decimal>,

    /// Balance carried over from the previous statement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_balance: Option<Decimal>,

    /// Charges for the current period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_charges: Option<Decimal>,

    /// Vendor contact information.
    #[serde(default)]
    pub contact: ContactInfo,

    /// Plan, usage and billing period details.
    #[serde(default)]
    pub service: ServiceDetails,

    /// Overall confidence (0.0 - 0.99).
    pub confidence: f32,

    /// Extraction metadata.
    #[serde(default)]
    pub metadata: ExtractionMetadata,
}

impl ExtractedBillRecord {
    /// Whether a human should double-check this record.
    pub fn needs_review(&self, threshold: f32) -> bool {
        self.confidence < threshold
    }
}

impl Default for ExtractedBillRecord {
    fn default() -> Self {
        Self {
            vendor_name: UNKNOWN_COMPANY.to_string(),
            amount: Decimal::ZERO,
            document_date: None,
            due_date: None,
            category: ServiceCategory::Other,
            account_number: None,
            tax_amount: None,
            previous_balance: None,
            current_charges: None,
            contact: ContactInfo::default(),
            service: ServiceDetails::default(),
            confidence: 0.0,
            metadata: ExtractionMetadata::default(),
        }
    }
}

/// Contact details found on a bill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.email.is_none() && self.website.is_none()
    }
}

/// Service plan details found on a bill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDetails {
    /// Plan or package name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,

    /// Usage figure with its unit (e.g. "845 kWh").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Billing period as printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<String>,
}

/// Result of parsing a retail receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedReceiptRecord {
    /// Store name.
    pub store_name: String,

    /// Transaction date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<NaiveDate>,

    /// Receipt total.
    pub total_amount: Decimal,

    /// Subtotal before tax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,

    /// Sales tax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<Decimal>,

    /// Line items, deduplicated by name and sorted by price descending.
    #[serde(default)]
    pub items: Vec<ReceiptLineItem>,

    /// Overall confidence (0.0 - 0.95).
    pub confidence: f32,

    /// Extraction metadata.
    #[serde(default)]
    pub metadata: ExtractionMetadata,
}

impl ExtractedReceiptRecord {
    /// Sum of all line item prices.
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(|i| i.price).sum()
    }

    /// Whether a human should double-check this record.
    pub fn needs_review(&self, threshold: f32) -> bool {
        self.confidence < threshold
    }
}

impl Default for ExtractedReceiptRecord {
    fn default() -> Self {
        Self {
            store_name: UNKNOWN_STORE.to_string(),
            transaction_date: None,
            total_amount: Decimal::ZERO,
            subtotal: None,
            tax_amount: None,
            items: Vec::new(),
            confidence: 0.0,
            metadata: ExtractionMetadata::default(),
        }
    }
}

/// A single product line on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLineItem {
    /// Cleaned product name.
    pub name: String,

    /// Quantity (at least 1).
    pub quantity: u32,

    /// Price for the whole line (quantity already applied).
    pub price: Decimal,

    /// Product category.
    pub category: ItemCategory,
}

/// Closed set of bill service categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceCategory {
    #[serde(rename = "Internet/Telecom")]
    InternetTelecom,
    #[serde(rename = "Utilities")]
    Utilities,
    #[serde(rename = "Insurance")]
    Insurance,
    #[serde(rename = "Software/SaaS")]
    SoftwareSaas,
    #[serde(rename = "Office Supplies")]
    OfficeSupplies,
    #[serde(rename = "Professional Services")]
    ProfessionalServices,
    #[serde(rename = "Healthcare")]
    Healthcare,
    #[serde(rename = "Maintenance/Repairs")]
    MaintenanceRepairs,
    #[serde(rename = "Financial Services")]
    FinancialServices,
    #[serde(rename = "Other")]
    #[default]
    Other,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 10] = [
        ServiceCategory::InternetTelecom,
        ServiceCategory::Utilities,
        ServiceCategory::Insurance,
        ServiceCategory::SoftwareSaas,
        ServiceCategory::OfficeSupplies,
        ServiceCategory::ProfessionalServices,
        ServiceCategory::Healthcare,
        ServiceCategory::MaintenanceRepairs,
        ServiceCategory::FinancialServices,
        ServiceCategory::Other,
    ];

    /// Display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::InternetTelecom => "Internet/Telecom",
            ServiceCategory::Utilities => "Utilities",
            ServiceCategory::Insurance => "Insurance",
            ServiceCategory::SoftwareSaas => "Software/SaaS",
            ServiceCategory::OfficeSupplies => "Office Supplies",
            ServiceCategory::ProfessionalServices => "Professional Services",
            ServiceCategory::Healthcare => "Healthcare",
            ServiceCategory::MaintenanceRepairs => "Maintenance/Repairs",
            ServiceCategory::FinancialServices => "Financial Services",
            ServiceCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceCategory {
    type Err = ExtractionError;

    /// Parse a display label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ExtractionError::Parse {
                field: "category".to_string(),
                value: s.to_string(),
            })
    }
}

/// Closed set of receipt item categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    #[serde(rename = "Produce")]
    Produce,
    #[serde(rename = "Meat & Seafood")]
    MeatSeafood,
    #[serde(rename = "Dairy")]
    Dairy,
    #[serde(rename = "Pantry")]
    Pantry,
    #[serde(rename = "Beverages")]
    Beverages,
    #[serde(rename = "Snacks")]
    Snacks,
    #[serde(rename = "Frozen")]
    Frozen,
    #[serde(rename = "Health & Beauty")]
    HealthBeauty,
    #[serde(rename = "Household")]
    Household,
    #[serde(rename = "Baby & Pet")]
    BabyPet,
    #[serde(rename = "Other")]
    #[default]
    Other,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 11] = [
        ItemCategory::Produce,
        ItemCategory::MeatSeafood,
        ItemCategory::Dairy,
        ItemCategory::Pantry,
        ItemCategory::Beverages,
        ItemCategory::Snacks,
        ItemCategory::Frozen,
        ItemCategory::HealthBeauty,
        ItemCategory::Household,
        ItemCategory::BabyPet,
        ItemCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Produce => "Produce",
            ItemCategory::MeatSeafood => "Meat & Seafood",
            ItemCategory::Dairy => "Dairy",
            ItemCategory::Pantry => "Pantry",
            ItemCategory::Beverages => "Beverages",
            ItemCategory::Snacks => "Snacks",
            ItemCategory::Frozen => "Frozen",
            ItemCategory::HealthBeauty => "Health & Beauty",
            ItemCategory::Household => "Household",
            ItemCategory::BabyPet => "Baby & Pet",
            ItemCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ExtractionError::Parse {
                field: "item category".to_string(),
                value: s.to_string(),
            })
    }
}

/// Metadata about the extraction process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Field-level confidence scores.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_confidence: BTreeMap<String, f32>,

    /// Warnings or issues encountered during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// OCR word confidence statistics, when the OCR engine supplied them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr: Option<WordStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_defaults() {
        let record = ExtractedBillRecord::default();
        assert_eq!(record.vendor_name, "Unknown Company");
        assert_eq!(record.amount, Decimal::ZERO);
        assert_eq!(record.category, ServiceCategory::Other);
        assert!(record.needs_review(0.5));
    }

    #[test]
    fn test_category_serde_labels() {
        let json = serde_json::to_string(&ServiceCategory::InternetTelecom).unwrap();
        assert_eq!(json, "\"Internet/Telecom\"");

        let parsed: ItemCategory = serde_json::from_str("\"Meat & Seafood\"").unwrap();
        assert_eq!(parsed, ItemCategory::MeatSeafood);

        for category in ServiceCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category));
        }
    }

    #[test]
    fn test_category_from_label() {
        assert_eq!("internet/telecom".parse(), Ok(ServiceCategory::InternetTelecom));
        assert_eq!(" Baby & Pet ".parse(), Ok(ItemCategory::BabyPet));
        assert_eq!(
            "Groceries".parse::<ServiceCategory>(),
            Err(ExtractionError::Parse {
                field: "category".to_string(),
                value: "Groceries".to_string(),
            })
        );
    }

    #[test]
    fn test_items_total() {
        let record = ExtractedReceiptRecord {
            items: vec![
                ReceiptLineItem {
                    name: "Apples".to_string(),
                    quantity: 2,
                    price: Decimal::new(499, 2),
                    category: ItemCategory::Produce,
                },
                ReceiptLineItem {
                    name: "Milk".to_string(),
                    quantity: 1,
                    price: Decimal::new(350, 2),
                    category: ItemCategory::Dairy,
                },
            ],
            ..Default::default()
        };
        assert_eq!(record.items_total(), Decimal::new(849, 2));
    }
}
