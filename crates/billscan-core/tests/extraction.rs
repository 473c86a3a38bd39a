//! End-to-end extraction behavior through the public API.

use std::str::FromStr;
use std::sync::Arc;
use std::thread;

use billscan_core::{
    BillParser, BillscanConfig, DocumentParser, ExtractedBillRecord, ExtractedReceiptRecord,
    ReceiptParser, ServiceCategory, parse_bill, parse_receipt,
};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use tempfile::tempdir;

const VERIZON_BILL: &str = "Verizon Wireless\n\
    PO Box 660108, Dallas, TX 75266\n\
    Invoice Date: 03/15/2024\n\
    Account Number: 442088731-00001\n\
    Your monthly wireless plan with unlimited data\n\
    Total Amount Due: $245.67";

const NOISY_INPUT: &[&str] = &[
    "",
    "   \n\t  ",
    "$$$$$$$$$$$$$$$$$$$$$$$",
    "TOTAL TOTAL TOTAL 99999999999.99",
    "Date: 99/99/9999 Due Date: 00/00/0000",
    "\u{feff}\u{200b}|||0O0O0O lll 111 SSS 555",
    "1 x 2 x 3 x 4.00\n5 @ 0.00\n-1 Apples -4.99",
];

fn bill_parser() -> BillParser {
    BillParser::new().with_reference_year(2024)
}

#[test]
fn test_verizon_bill_end_to_end() {
    let record = bill_parser().parse(VERIZON_BILL);

    assert_eq!(record.amount, Decimal::from_str("245.67").unwrap());
    assert_eq!(record.vendor_name, "Verizon");
    assert_eq!(record.document_date, NaiveDate::from_ymd_opt(2024, 3, 15));
    assert_eq!(record.category, ServiceCategory::InternetTelecom);
    assert_eq!(record.category.to_string(), "Internet/Telecom");
    assert!(record.confidence > 0.5, "confidence {}", record.confidence);
}

#[test]
fn test_minimal_verizon_lines() {
    let text = "Total Amount Due: $245.67\nInvoice Date: 03/15/2024\nVerizon Wireless";
    let record = bill_parser().parse(text);

    assert_eq!(record.amount, Decimal::from_str("245.67").unwrap());
    assert_eq!(record.vendor_name, "Verizon");
    assert_eq!(record.document_date, NaiveDate::from_ymd_opt(2024, 3, 15));
    assert_eq!(record.category, ServiceCategory::InternetTelecom);
    assert!(record.confidence > 0.5);
}

#[test]
fn test_empty_input_is_fully_defaulted() {
    let bill = parse_bill("");
    assert_eq!(bill.vendor_name, ExtractedBillRecord::default().vendor_name);
    assert_eq!(bill.amount, Decimal::ZERO);
    assert_eq!(bill.category, ServiceCategory::Other);
    assert_eq!(bill.document_date, None);
    assert_eq!(bill.due_date, None);
    assert_eq!(bill.confidence, 0.0);

    let receipt = parse_receipt("");
    assert_eq!(receipt.store_name, "Unknown Store");
    assert_eq!(receipt.total_amount, Decimal::ZERO);
    assert!(receipt.items.is_empty());
    assert_eq!(receipt.transaction_date, None);
    assert_eq!(receipt.confidence, 0.0);
}

#[test]
fn test_confidence_bounds_on_noisy_input() {
    let bills = bill_parser();
    let receipts = ReceiptParser::new().with_reference_year(2024);

    for text in NOISY_INPUT.iter().copied().chain([VERIZON_BILL]) {
        let bill = bills.parse(text);
        assert!((0.0..=0.99).contains(&bill.confidence), "{:?}: {}", text, bill.confidence);
        assert!(bill.amount >= Decimal::ZERO);

        let receipt = receipts.parse(text);
        assert!((0.0..=0.95).contains(&receipt.confidence), "{:?}: {}", text, receipt.confidence);
        assert!(receipt.items.iter().all(|i| i.quantity >= 1 && i.price > Decimal::ZERO));
    }
}

#[test]
fn test_receipt_items_unique_and_sorted() {
    let text = "KIRK MARKET\n\
        2024-01-20\n\
        Bananas 3 @ 0.59\n\
        2 Apples 4.99\n\
        Chicken Breast 11.42\n\
        APPLES 4.99\n\
        Paper Towels 6.79\n\
        TOTAL 24.97\n\
        CASH 30.00\n\
        CHANGE 5.03";

    let record = ReceiptParser::new().with_reference_year(2024).parse(text);

    assert_eq!(record.store_name, "Kirk Market");
    let names: Vec<&str> = record.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Chicken Breast", "Paper Towels", "Apples", "Bananas"]);
    assert!(record.items.windows(2).all(|w| w[0].price >= w[1].price));
    assert_eq!(record.total_amount, Decimal::from_str("24.97").unwrap());
}

#[test]
fn test_records_serialize_to_json() {
    let record = bill_parser().parse(VERIZON_BILL);
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["vendor_name"], "Verizon");
    assert_eq!(json["category"], "Internet/Telecom");
    assert_eq!(json["document_date"], "2024-03-15");

    let back: ExtractedBillRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, record);

    let receipt = ExtractedReceiptRecord::default();
    let json = serde_json::to_string(&receipt).unwrap();
    assert!(json.contains("Unknown Store"));
}

#[test]
fn test_concurrent_parsing_is_deterministic() {
    let parser = Arc::new(bill_parser());
    let expected = parser.parse(VERIZON_BILL);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let parser = Arc::clone(&parser);
            thread::spawn(move || parser.parse(VERIZON_BILL))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_config_round_trip_drives_parser() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut config = BillscanConfig::default();
    config.extraction.min_text_length = 500;
    config.save(&path).unwrap();

    let loaded = BillscanConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);

    let record = bill_parser().with_config(loaded).parse(VERIZON_BILL);
    assert_eq!(record.confidence, 0.0);
    assert_eq!(record.vendor_name, "Unknown Company");
}
