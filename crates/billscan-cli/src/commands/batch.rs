//! Batch processing command for multiple OCR text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::StreamExt;
use futures_util::stream;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use billscan_core::models::config::BillscanConfig;

use super::process::{
    Document, DocumentMode, OutputFormat, format_document, load_input, parse_document,
};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Document type
    #[arg(short, long, value_enum, default_value = "bill")]
    mode: DocumentMode,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Confidence below which a document is flagged for manual review
    #[arg(long, default_value = "0.5")]
    review_threshold: f32,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    document: Option<Document>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        BillscanConfig::from_file(Path::new(path))?
    } else {
        BillscanConfig::default()
    };
    let config = Arc::new(config);

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "txt" | "json")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mode = args.mode;
    let mut tasks = stream::iter(files)
        .map(|path| {
            let config = Arc::clone(&config);
            tokio::task::spawn_blocking(move || {
                let file_start = Instant::now();
                let result = load_input(&path).map(|ocr| parse_document(&ocr, mode, &config));
                (path, result, file_start.elapsed().as_millis() as u64)
            })
        })
        .buffer_unordered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(joined) = tasks.next().await {
        let (path, result, processing_time_ms) = joined?;

        match result {
            Ok(document) => {
                results.push(ProcessResult {
                    path,
                    document: Some(document),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        document: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    // Workers finish out of order
    results.sort_by(|a, b| a.path.cmp(&b.path));

    let successful: Vec<_> = results.iter().filter(|r| r.document.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let flagged = successful
        .iter()
        .filter(|r| {
            r.document
                .as_ref()
                .is_some_and(|d| d.needs_review(args.review_threshold))
        })
        .count();

    // Write outputs
    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            let Some(document) = &result.document else {
                continue;
            };

            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("document");
            let output_path =
                output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            fs::write(&output_path, format_document(document, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results, mode, args.review_threshold)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed, {} need review",
        style(successful.len()).green(),
        style(failed.len()).red(),
        style(flagged).yellow()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(
    path: &Path,
    results: &[ProcessResult],
    mode: DocumentMode,
    review_threshold: f32,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "mode",
        "issuer",
        "amount",
        "date",
        "confidence",
        "needs_review",
        "processing_time_ms",
        "error",
    ])?;

    let mode = match mode {
        DocumentMode::Bill => "bill",
        DocumentMode::Receipt => "receipt",
    };

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let processing_time_ms = result.processing_time_ms.to_string();

        if let Some(document) = &result.document {
            let amount = document.amount();
            let date = document.date().map(|d| d.to_string()).unwrap_or_default();
            let confidence = format!("{:.2}", document.confidence());
            let needs_review = document.needs_review(review_threshold).to_string();

            wtr.write_record([
                filename,
                "success",
                mode,
                document.issuer(),
                &amount,
                &date,
                &confidence,
                &needs_review,
                &processing_time_ms,
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                mode,
                "",
                "",
                "",
                "",
                "",
                &processing_time_ms,
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
