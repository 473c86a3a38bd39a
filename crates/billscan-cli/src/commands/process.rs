//! Process command - extract data from a single OCR text file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info};

use billscan_core::models::config::BillscanConfig;
use billscan_core::{
    BillParser, DocumentParser, ExtractedBillRecord, ExtractedReceiptRecord, OcrOutput,
    ReceiptParser,
};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (.txt with OCR text, or .json with OCR output)
    #[arg(required = true)]
    input: PathBuf,

    /// Document type
    #[arg(short, long, value_enum, default_value = "bill")]
    mode: DocumentMode,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction confidence scores
    #[arg(long)]
    show_confidence: bool,

    /// Confidence below which the document is flagged for manual review
    #[arg(long, default_value = "0.5")]
    review_threshold: f32,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum DocumentMode {
    /// Utility, telecom or service bill
    Bill,
    /// Retail receipt
    Receipt,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// A parsed bill or receipt.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Document {
    Bill(ExtractedBillRecord),
    Receipt(ExtractedReceiptRecord),
}

impl Document {
    pub fn confidence(&self) -> f32 {
        match self {
            Document::Bill(bill) => bill.confidence,
            Document::Receipt(receipt) => receipt.confidence,
        }
    }

    pub fn needs_review(&self, threshold: f32) -> bool {
        match self {
            Document::Bill(bill) => bill.needs_review(threshold),
            Document::Receipt(receipt) => receipt.needs_review(threshold),
        }
    }

    /// Vendor or store name.
    pub fn issuer(&self) -> &str {
        match self {
            Document::Bill(bill) => &bill.vendor_name,
            Document::Receipt(receipt) => &receipt.store_name,
        }
    }

    /// Amount due or receipt total.
    pub fn amount(&self) -> String {
        match self {
            Document::Bill(bill) => bill.amount.to_string(),
            Document::Receipt(receipt) => receipt.total_amount.to_string(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Document::Bill(bill) => bill.document_date,
            Document::Receipt(receipt) => receipt.transaction_date,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            Document::Bill(bill) => &bill.metadata.warnings,
            Document::Receipt(receipt) => &receipt.metadata.warnings,
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        BillscanConfig::from_file(Path::new(path))?
    } else {
        BillscanConfig::default()
    };

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );

    pb.set_message("Reading OCR output...");
    let ocr = load_input(&args.input)?;

    pb.set_message("Extracting fields...");
    let document = parse_document(&ocr, args.mode, &config);

    pb.finish_and_clear();

    // Format output
    let output = format_document(&document, args.format)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if document.needs_review(args.review_threshold) {
        eprintln!(
            "{} Low confidence ({:.1}%), manual review recommended",
            style("!").yellow(),
            document.confidence() * 100.0
        );
    }

    // Show summary
    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.1}%",
            style("ℹ").blue(),
            document.confidence() * 100.0
        );
        for warning in document.warnings() {
            println!("{} {}", style("ℹ").blue(), warning);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read OCR output from a file: plain text, or JSON with per-word confidences.
pub fn load_input(path: &Path) -> anyhow::Result<OcrOutput> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let content = fs::read_to_string(path)?;

    match extension.as_str() {
        "json" => Ok(serde_json::from_str(&content)?),
        _ => Ok(OcrOutput::new(content)),
    }
}

/// Parse OCR output as the given document type.
pub fn parse_document(ocr: &OcrOutput, mode: DocumentMode, config: &BillscanConfig) -> Document {
    match mode {
        DocumentMode::Bill => {
            Document::Bill(BillParser::new().with_config(config.clone()).parse_ocr(ocr))
        }
        DocumentMode::Receipt => {
            Document::Receipt(ReceiptParser::new().with_config(config.clone()).parse_ocr(ocr))
        }
    }
}

pub fn format_document(document: &Document, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(document)?),
        OutputFormat::Csv => format_csv(document),
        OutputFormat::Text => Ok(format_text(document)),
    }
}

fn format_csv(document: &Document) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    match document {
        Document::Bill(bill) => {
            wtr.write_record([
                "vendor_name",
                "amount",
                "document_date",
                "due_date",
                "category",
                "account_number",
                "confidence",
            ])?;

            let amount = bill.amount.to_string();
            let document_date = bill.document_date.map(|d| d.to_string()).unwrap_or_default();
            let due_date = bill.due_date.map(|d| d.to_string()).unwrap_or_default();
            let confidence = format!("{:.2}", bill.confidence);

            wtr.write_record([
                bill.vendor_name.as_str(),
                &amount,
                &document_date,
                &due_date,
                bill.category.as_str(),
                bill.account_number.as_deref().unwrap_or(""),
                &confidence,
            ])?;
        }
        Document::Receipt(receipt) => {
            wtr.write_record([
                "store_name",
                "transaction_date",
                "total_amount",
                "item_name",
                "quantity",
                "price",
                "item_category",
            ])?;

            let date = receipt
                .transaction_date
                .map(|d| d.to_string())
                .unwrap_or_default();
            let total = receipt.total_amount.to_string();

            // One row per item; a receipt without items still gets one row
            if receipt.items.is_empty() {
                wtr.write_record([receipt.store_name.as_str(), &date, &total, "", "", "", ""])?;
            }
            for item in &receipt.items {
                let quantity = item.quantity.to_string();
                let price = item.price.to_string();
                wtr.write_record([
                    receipt.store_name.as_str(),
                    &date,
                    &total,
                    &item.name,
                    &quantity,
                    &price,
                    item.category.as_str(),
                ])?;
            }
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(document: &Document) -> String {
    let mut output = String::new();

    match document {
        Document::Bill(bill) => {
            output.push_str(&format!("Vendor: {}\n", bill.vendor_name));
            output.push_str(&format!("Category: {}\n", bill.category));
            if let Some(date) = bill.document_date {
                output.push_str(&format!("Date: {}\n", date));
            }
            if let Some(account) = &bill.account_number {
                output.push_str(&format!("Account: {}\n", account));
            }
            output.push('\n');

            output.push_str(&format!("Amount due: {}\n", bill.amount));
            if let Some(previous) = bill.previous_balance {
                output.push_str(&format!("  Previous balance: {}\n", previous));
            }
            if let Some(tax) = bill.tax_amount {
                output.push_str(&format!("  Tax: {}\n", tax));
            }

            if !bill.contact.is_empty() {
                output.push_str("\nContact:\n");
                for value in [&bill.contact.phone, &bill.contact.email, &bill.contact.website]
                    .into_iter()
                    .flatten()
                {
                    output.push_str(&format!("  {}\n", value));
                }
            }

            if let Some(due_date) = bill.due_date {
                output.push_str(&format!("\nPayment due: {}\n", due_date));
            }
        }
        Document::Receipt(receipt) => {
            output.push_str(&format!("Store: {}\n", receipt.store_name));
            if let Some(date) = receipt.transaction_date {
                output.push_str(&format!("Date: {}\n", date));
            }
            output.push('\n');

            output.push_str("Items:\n");
            for item in &receipt.items {
                output.push_str(&format!(
                    "  {:>3} x {:<32} {:>10}  ({})\n",
                    item.quantity, item.name, item.price, item.category
                ));
            }
            output.push('\n');

            if let Some(subtotal) = receipt.subtotal {
                output.push_str(&format!("Subtotal: {}\n", subtotal));
            }
            if let Some(tax) = receipt.tax_amount {
                output.push_str(&format!("Tax:      {}\n", tax));
            }
            output.push_str(&format!("Total:    {}\n", receipt.total_amount));
        }
    }

    output
}
