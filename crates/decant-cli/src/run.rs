//! Batch import driver.
//!
//! One bad document never stops the run: extraction and parse failures
//! are recorded per file and the batch continues. Without `--write`
//! the parsed invoices are printed as JSON for inspection.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use console::style;
use tracing::{error, info, warn};

use decant_core::{
    parse_invoice, DecantConfig, ImportOptions, ImportOutcome, InvoiceStore, ParseError,
    ParsedInvoice, PdftotextExtractor, PostgresStore, TextExtractor,
};

use crate::Cli;

/// Outcome of one file in the batch.
enum FileStatus {
    Imported,
    Parsed,
    Skipped(String),
    Failed(String),
}

struct FileResult {
    path: PathBuf,
    invoice: Option<ParsedInvoice>,
    outcome: Option<ImportOutcome>,
    status: FileStatus,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = match cli.config.as_deref() {
        Some(path) => DecantConfig::from_file(path)?,
        None => DecantConfig::default(),
    };

    // The default invoices directory is a sibling of the working
    // directory, not a child.
    let directory = cli
        .directory
        .clone()
        .unwrap_or_else(|| Path::new("..").join(&config.extraction.default_directory));

    let mut files = collect_pdfs(&directory)?;
    if let Some(limit) = cli.limit {
        files.truncate(limit);
    }
    if files.is_empty() {
        // An empty directory is a clean no-op, not a failure.
        println!(
            "{} No PDF invoices found in {}",
            style("ℹ").blue(),
            directory.display()
        );
        return Ok(());
    }

    println!(
        "{} Found {} invoices in {}",
        style("ℹ").blue(),
        files.len(),
        directory.display()
    );

    let store = if cli.write {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("--write requires DATABASE_URL to be set"))?;
        Some(PostgresStore::connect(&database_url).await?)
    } else {
        None
    };
    let options = ImportOptions {
        tenant_slug: config.import.tenant_slug.clone(),
        default_case_multiplier: config.import.default_case_multiplier,
        currency: config.import.currency.clone(),
    };

    let extractor = PdftotextExtractor::new(&config.extraction.pdftotext_bin);

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let result = process_file(&path, &extractor, store.as_ref(), &options, cli.write).await;
        results.push(result);
    }

    if let Some(summary_path) = cli.summary.as_deref() {
        write_summary(summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    report(&results, start);
    Ok(())
}

/// PDF files in the directory, sorted by name for stable runs.
fn collect_pdfs(directory: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(directory)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", directory.display(), e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort();
    Ok(files)
}

async fn process_file(
    path: &Path,
    extractor: &PdftotextExtractor,
    store: Option<&PostgresStore>,
    options: &ImportOptions,
    write: bool,
) -> FileResult {
    let source = path.display().to_string();

    let text = match extractor.extract(path) {
        Ok(text) => text,
        Err(e) => {
            error!(file = %source, "extraction failed: {e}");
            return FileResult {
                path: path.to_path_buf(),
                invoice: None,
                outcome: None,
                status: FileStatus::Failed(e.to_string()),
            };
        }
    };

    let invoice = match parse_invoice(&text, &source) {
        Ok(invoice) => invoice,
        Err(ParseError::UnsupportedFormat) => {
            warn!(file = %source, "unrecognized invoice format, skipping");
            return FileResult {
                path: path.to_path_buf(),
                invoice: None,
                outcome: None,
                status: FileStatus::Skipped("unrecognized format".to_string()),
            };
        }
        Err(e) => {
            error!(file = %source, "parse failed: {e}");
            return FileResult {
                path: path.to_path_buf(),
                invoice: None,
                outcome: None,
                status: FileStatus::Failed(e.to_string()),
            };
        }
    };

    if !write {
        match serde_json::to_string_pretty(&invoice) {
            Ok(json) => println!("{json}"),
            Err(e) => error!(file = %source, "serialization failed: {e}"),
        }
        return FileResult {
            path: path.to_path_buf(),
            invoice: Some(invoice),
            outcome: None,
            status: FileStatus::Parsed,
        };
    }

    let store = store.expect("store is connected when writing");
    match store.upsert_invoice(&invoice, options).await {
        Ok(outcome) => {
            info!(
                file = %source,
                invoice = %invoice.invoice_number,
                replaced = outcome.replaced,
                lines = outcome.lines_written,
                "imported"
            );
            FileResult {
                path: path.to_path_buf(),
                invoice: Some(invoice),
                outcome: Some(outcome),
                status: FileStatus::Imported,
            }
        }
        Err(e) => {
            error!(file = %source, "import failed: {e}");
            FileResult {
                path: path.to_path_buf(),
                invoice: Some(invoice),
                outcome: None,
                status: FileStatus::Failed(e.to_string()),
            }
        }
    }
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "vendor",
        "invoice_number",
        "invoice_date",
        "items",
        "lines_written",
        "lines_skipped",
        "total",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let (status, error) = match &result.status {
            FileStatus::Imported => ("imported", String::new()),
            FileStatus::Parsed => ("parsed", String::new()),
            FileStatus::Skipped(reason) => ("skipped", reason.clone()),
            FileStatus::Failed(reason) => ("failed", reason.clone()),
        };

        if let Some(invoice) = &result.invoice {
            wtr.write_record([
                filename,
                status,
                &invoice.vendor,
                &invoice.invoice_number,
                &invoice
                    .invoice_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                &invoice.items.len().to_string(),
                &result
                    .outcome
                    .as_ref()
                    .map(|o| o.lines_written.to_string())
                    .unwrap_or_default(),
                &result
                    .outcome
                    .as_ref()
                    .map(|o| o.lines_skipped.to_string())
                    .unwrap_or_default(),
                &invoice.total.map(|t| t.to_string()).unwrap_or_default(),
                &error,
            ])?;
        } else {
            wtr.write_record([filename, status, "", "", "", "", "", "", "", &error])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

fn report(results: &[FileResult], start: Instant) {
    let imported = results
        .iter()
        .filter(|r| matches!(r.status, FileStatus::Imported | FileStatus::Parsed))
        .count();
    let skipped = results
        .iter()
        .filter(|r| matches!(r.status, FileStatus::Skipped(_)))
        .count();
    let failed: Vec<_> = results
        .iter()
        .filter(|r| matches!(r.status, FileStatus::Failed(_)))
        .collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} processed, {} skipped, {} failed",
        style(imported).green(),
        style(skipped).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            let FileStatus::Failed(reason) = &result.status else {
                continue;
            };
            println!("  - {}: {}", result.path.display(), reason);
        }
    }
}
