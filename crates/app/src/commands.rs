use std::path::Path;

use anyhow::Context;
use mitsumori_core::{ExtractConfig, RunReport};
use mitsumori_ocr::OcrBackend;
use mitsumori_pdf::{is_sparse, page_layout_texts};

use crate::batch::{process_dir, BatchResult};

/// Extract everything and print the items as pretty JSON, followed by the
/// per-file outcomes.
pub fn scan(
    dir: &Path,
    config: &ExtractConfig,
    ocr: Option<&dyn OcrBackend>,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    let BatchResult { items, report } = process_dir(dir, config, ocr)?;

    println!("{}", serde_json::to_string_pretty(&items)?);
    print_report(&report);
    write_report(&report, report_path)?;
    Ok(())
}

/// Extract, consolidate, and write the summary workbook.
pub fn export(
    dir: &Path,
    output: &Path,
    config: &ExtractConfig,
    ocr: Option<&dyn OcrBackend>,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    let BatchResult { items, report } = process_dir(dir, config, ocr)?;

    if items.is_empty() {
        println!("No data extracted.");
    } else {
        mitsumori_excel::write_summary(&items, output)
            .with_context(|| format!("writing {}", output.display()))?;
        println!("Saved {} items to {}", items.len(), output.display());
    }
    print_report(&report);
    write_report(&report, report_path)?;
    Ok(())
}

/// Extract, consolidate, and merge into an existing master list.
pub fn update(
    dir: &Path,
    master: &Path,
    config: &ExtractConfig,
    ocr: Option<&dyn OcrBackend>,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    anyhow::ensure!(master.exists(), "master list not found: {}", master.display());

    let BatchResult { items, report } = process_dir(dir, config, ocr)?;

    if items.is_empty() {
        println!("No data found to update.");
    } else {
        let row = mitsumori_excel::update_master(&items, master, &config.grand_total_marker)
            .with_context(|| format!("updating {}", master.display()))?;
        println!(
            "Inserted {} items into {} starting at row {row}",
            items.len(),
            master.display()
        );
    }
    print_report(&report);
    write_report(&report, report_path)?;
    Ok(())
}

/// Classify each PDF in the directory as text-based or image-based, without
/// extracting anything. Useful before deciding whether an OCR-enabled build
/// is needed.
pub fn check(dir: &Path) -> anyhow::Result<()> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    paths.sort();

    for path in &paths {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
        let verdict = match std::fs::read(path).map(|bytes| page_layout_texts(&bytes)) {
            Ok(Ok(pages)) => {
                let first = pages.first().map(String::as_str).unwrap_or("");
                if is_sparse(first) {
                    "Image-based or empty (needs OCR)".to_string()
                } else {
                    format!("Text-based ({} chars on page 1)", first.len())
                }
            }
            Ok(Err(e)) => format!("Error: {e}"),
            Err(e) => format!("Error: {e}"),
        };
        println!("{name}: {verdict}");
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    use mitsumori_core::FileOutcome;

    println!();
    for file in &report.files {
        match &file.outcome {
            FileOutcome::Extracted { items } => println!("  {}: {items} items", file.file),
            FileOutcome::NoItems => println!("  {}: no items extracted", file.file),
            FileOutcome::Failed { message } => println!("  {}: FAILED — {message}", file.file),
        }
    }
    println!(
        "{} items from {} files ({} failed)",
        report.total_items(),
        report.files.len(),
        report.failed_count()
    );
}

fn write_report(report: &RunReport, path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = path {
        std::fs::write(path, serde_json::to_vec_pretty(report)?)
            .with_context(|| format!("writing report {}", path.display()))?;
        tracing::info!(path = %path.display(), "run report written");
    }
    Ok(())
}
