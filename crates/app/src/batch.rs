use std::path::{Path, PathBuf};

use mitsumori_core::{
    consolidate, CompiledKeywords, ExtractConfig, FileOutcome, LineItem, RunReport,
};
use mitsumori_excel::read_grids;
use mitsumori_extract::{extract_sheet, reconstruct};
use mitsumori_ocr::OcrBackend;
use mitsumori_pdf::PdfSource;

pub struct BatchResult {
    pub items: Vec<LineItem>,
    pub report: RunReport,
}

/// Walk one directory of quotation files and extract everything extractable.
///
/// Files are processed sequentially; a failure on one file is recorded in
/// the report and the batch continues. Only a missing or unreadable input
/// directory is fatal. Office lock files (`~$` prefix) and unrelated
/// extensions are skipped without a report entry.
pub fn process_dir(
    dir: &Path,
    config: &ExtractConfig,
    ocr: Option<&dyn OcrBackend>,
) -> anyhow::Result<BatchResult> {
    let keywords = config.keywords.compile()?;

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    // Directory order is filesystem-dependent; sort for a stable report.
    paths.sort();

    let mut items = Vec::new();
    let mut report = RunReport::default();

    for path in &paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with("~$") {
            continue;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        let span = tracing::info_span!("file", name = %name);
        let _guard = span.enter();

        let outcome = match ext.as_deref() {
            Some("xlsx" | "xls") => process_excel(path, name, &keywords, config),
            Some("pdf") => process_pdf(path, name, config, ocr),
            _ => continue,
        };

        match outcome {
            Ok(extracted) if extracted.is_empty() => {
                tracing::info!("no items extracted");
                report.push(name, FileOutcome::NoItems);
            }
            Ok(extracted) => {
                tracing::info!(items = extracted.len(), "extracted");
                report.push(name, FileOutcome::Extracted { items: extracted.len() });
                items.extend(extracted);
            }
            Err(message) => {
                tracing::warn!(error = %message, "file skipped");
                report.push(name, FileOutcome::Failed { message });
            }
        }
    }

    consolidate(&mut items, &config.vendors);
    Ok(BatchResult { items, report })
}

fn process_excel(
    path: &Path,
    name: &str,
    keywords: &CompiledKeywords,
    config: &ExtractConfig,
) -> Result<Vec<LineItem>, String> {
    let grids = read_grids(path).map_err(|e| e.to_string())?;
    Ok(grids
        .iter()
        .flat_map(|grid| extract_sheet(grid, keywords, config, name))
        .collect())
}

fn process_pdf(
    path: &Path,
    name: &str,
    config: &ExtractConfig,
    ocr: Option<&dyn OcrBackend>,
) -> Result<Vec<LineItem>, String> {
    let source = PdfSource::new(ocr, config.min_ocr_confidence);
    let pages = source.page_texts(path).map_err(|e| e.to_string())?;

    // Reconstruction sees the whole document as one line stream — vertical
    // field blocks occasionally straddle a page break.
    let lines: Vec<String> = pages.into_iter().flat_map(|p| p.lines).collect();
    Ok(reconstruct(&lines, config, name))
}
