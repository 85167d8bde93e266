use std::path::Path;

use mitsumori_core::LineItem;
use umya_spreadsheet::Worksheet;

use crate::ExcelError;

// Fixed column positions of the master list (1-based).
const COL_PART_NO: u32 = 1;
const COL_NAME: u32 = 3;
const COL_UNIT_PRICE: u32 = 9;
const COL_VENDOR: u32 = 10;
const COL_AMOUNT: u32 = 15;

/// Insert extracted items into an existing master-list workbook.
///
/// The insertion point is found scanning top-down from row 2: the first row
/// whose first column is empty, or the row containing the grand-total
/// marker, whichever comes first; when neither exists the items append at
/// the end. Inserted rows copy per-cell styling from the row immediately
/// above the insertion point so they blend into the sheet.
///
/// Returns the 1-based row the first item landed on.
pub fn update_master(
    items: &[LineItem],
    path: &Path,
    grand_total_marker: &str,
) -> Result<u32, ExcelError> {
    let mut book = umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|e| ExcelError::Open(e.to_string()))?;
    let sheet = book
        .get_sheet_mut(&0)
        .ok_or_else(|| ExcelError::Open("workbook has no sheets".into()))?;

    let insert_row = find_insert_row(sheet, grand_total_marker);
    tracing::info!(items = items.len(), row = insert_row, "inserting into master list");

    sheet.insert_new_row(&insert_row, &(items.len() as u32));

    // Style reference: the row above the insertion point, clamped to the
    // first data row when inserting directly under the header.
    let ref_row = if insert_row >= 3 { insert_row - 1 } else { 2 };

    for (i, item) in items.iter().enumerate() {
        let row = insert_row + i as u32;
        sheet.get_cell_mut((COL_PART_NO, row)).set_value_string(item.part_no.as_str());
        sheet.get_cell_mut((COL_NAME, row)).set_value_string(item.name.as_str());
        sheet.get_cell_mut((COL_UNIT_PRICE, row)).set_value_number(item.unit_price as f64);
        sheet.get_cell_mut((COL_AMOUNT, row)).set_value_number(item.amount as f64);
        if !item.vendor.is_empty() {
            sheet.get_cell_mut((COL_VENDOR, row)).set_value_string(item.vendor.as_str());
        }

        let max_col = sheet.get_highest_column();
        for col in 1..=max_col {
            let style = sheet.get_cell((col, ref_row)).map(|c| c.get_style().clone());
            if let Some(style) = style {
                sheet.get_cell_mut((col, row)).set_style(style);
            }
        }
    }

    umya_spreadsheet::writer::xlsx::write(&book, path)
        .map_err(|e| ExcelError::Write(e.to_string()))?;
    Ok(insert_row)
}

fn find_insert_row(sheet: &Worksheet, grand_total_marker: &str) -> u32 {
    let max_row = sheet.get_highest_row();
    let max_col = sheet.get_highest_column();

    for row in 2..=max_row {
        let marker_hit = (1..=max_col)
            .any(|col| sheet.get_value((col, row)).trim() == grand_total_marker);
        if marker_hit {
            return row;
        }
        let first = sheet.get_value((1u32, row));
        let first = first.trim();
        if first.is_empty() || first == "nan" || first == "None" {
            return row;
        }
    }
    max_row + 1
}
