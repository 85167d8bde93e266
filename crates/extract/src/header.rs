use mitsumori_core::normalize::clean_text;
use mitsumori_core::{ColumnMap, CompiledKeywords, Grid};

/// A located header: the row index and the field → column mapping derived
/// from it. Consumed read-only by the row extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRow {
    pub row: usize,
    pub columns: ColumnMap,
}

/// Scan a grid for the row most likely to be the column header.
///
/// Each row is scored by the number of distinct canonical fields whose alias
/// patterns match one of its cells; the first matching column per field
/// wins and is never overwritten. The best row is the one with the strictly
/// highest score of at least `min_score` — on ties the earliest row stands,
/// since the scan only replaces the best on strict improvement.
pub fn locate_header(
    grid: &Grid,
    keywords: &CompiledKeywords,
    min_score: usize,
) -> Option<HeaderRow> {
    let mut best: Option<HeaderRow> = None;
    let mut best_score = 0usize;

    for (row_idx, row) in grid.rows.iter().enumerate() {
        let mut columns = ColumnMap::default();
        for (col_idx, cell) in row.iter().enumerate() {
            if cell.is_blank() {
                continue;
            }
            let text = clean_text(&cell.to_text());
            for (field, patterns) in keywords.fields() {
                if columns.get(field).is_some() {
                    continue;
                }
                if patterns.iter().any(|re| re.is_match(&text)) {
                    columns.set_if_absent(field, col_idx);
                }
            }
        }

        let score = columns.len();
        if score >= min_score && score > best_score {
            tracing::debug!(sheet = %grid.name, row = row_idx, score, "header candidate");
            best_score = score;
            best = Some(HeaderRow { row: row_idx, columns });
        }
    }

    if best.is_none() {
        tracing::debug!(sheet = %grid.name, "no header row located");
    }
    best
}
