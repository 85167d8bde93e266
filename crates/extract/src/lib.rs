pub mod classify;
pub mod header;
pub mod reconstruct;
pub mod rows;

pub use classify::{classify_line, LineClass};
pub use header::{locate_header, HeaderRow};
pub use reconstruct::reconstruct;
pub use rows::extract_rows;

use mitsumori_core::{CompiledKeywords, ExtractConfig, Grid, LineItem};

/// Run the full tabular pipeline over one sheet: locate the header, then
/// extract the rows below it. A `None` header means the sheet contributes
/// nothing — an unrecognized layout, not an error. The keyword table is
/// compiled once per run by the caller and shared across sheets.
pub fn extract_sheet(
    grid: &Grid,
    keywords: &CompiledKeywords,
    config: &ExtractConfig,
    source: &str,
) -> Vec<LineItem> {
    match locate_header(grid, keywords, config.min_header_score) {
        Some(header) => {
            tracing::debug!(
                sheet = %grid.name,
                row = header.row,
                fields = header.columns.len(),
                "header located"
            );
            extract_rows(grid, &header, config, source)
        }
        None => Vec::new(),
    }
}
