use mitsumori_core::normalize::{clean_text, parse_price, parse_quantity};
use mitsumori_core::{ExtractConfig, FieldKind, Grid, LineItem};

use crate::header::HeaderRow;

/// Walk the rows strictly after a located header and pull one `LineItem`
/// per data row.
///
/// Blank cells and literal empty markers are skipped; price fields are
/// normalized to whole yen; rows with no populated canonical field are
/// dropped. A row whose name or part-number value contains the total marker
/// is the totals sentinel: it and everything after it are excluded —
/// summary rows follow data rows and must not be mistaken for items.
pub fn extract_rows(
    grid: &Grid,
    header: &HeaderRow,
    config: &ExtractConfig,
    source: &str,
) -> Vec<LineItem> {
    let mut items = Vec::new();

    'rows: for row_idx in header.row + 1..grid.row_count() {
        let mut item = LineItem::new(source);
        let mut populated = 0usize;

        for (field, col) in header.columns.iter() {
            let Some(cell) = grid.cell(row_idx, col) else {
                continue;
            };
            if cell.is_blank() {
                continue;
            }
            let text = clean_text(&cell.to_text());
            if text.is_empty() {
                continue;
            }

            if matches!(field, FieldKind::Name | FieldKind::PartNo)
                && text.contains(&config.total_marker)
            {
                tracing::debug!(sheet = %grid.name, row = row_idx, "totals sentinel — stopping");
                break 'rows;
            }

            populated += 1;
            match field {
                FieldKind::PartNo => item.part_no = text,
                FieldKind::Name => item.name = text,
                FieldKind::Quantity => item.quantity = parse_quantity(&text),
                FieldKind::Unit => item.unit = text,
                FieldKind::UnitPrice => item.unit_price = parse_price(&text),
                FieldKind::Amount => item.amount = parse_price(&text),
            }
        }

        if populated == 0 {
            continue;
        }
        items.push(item);
    }

    items
}
