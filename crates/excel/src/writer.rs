use std::path::Path;

use mitsumori_core::LineItem;

use crate::ExcelError;

/// Fixed column order of the summary workbook.
pub const SUMMARY_COLUMNS: [&str; 7] =
    ["ファイル名", "品名", "図番/型番", "数量", "単位", "単価", "金額"];

/// Write the consolidated items as a fresh summary workbook: one header row,
/// one row per item, columns in `SUMMARY_COLUMNS` order. Deterministic —
/// the same item set always produces the same sheet.
pub fn write_summary(items: &[LineItem], path: &Path) -> Result<(), ExcelError> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_by_name_mut("Sheet1")
        .ok_or_else(|| ExcelError::Write("default sheet missing".into()))?;

    for (col, title) in SUMMARY_COLUMNS.iter().enumerate() {
        sheet
            .get_cell_mut(((col + 1) as u32, 1u32))
            .set_value_string(*title);
    }

    for (i, item) in items.iter().enumerate() {
        let row = (i + 2) as u32;
        sheet.get_cell_mut((1u32, row)).set_value_string(item.source.as_str());
        sheet.get_cell_mut((2u32, row)).set_value_string(item.name.as_str());
        sheet.get_cell_mut((3u32, row)).set_value_string(item.part_no.as_str());
        sheet.get_cell_mut((4u32, row)).set_value_number(item.quantity as f64);
        sheet.get_cell_mut((5u32, row)).set_value_string(item.unit.as_str());
        sheet.get_cell_mut((6u32, row)).set_value_number(item.unit_price as f64);
        sheet.get_cell_mut((7u32, row)).set_value_number(item.amount as f64);
    }

    tracing::info!(items = items.len(), path = %path.display(), "summary written");
    umya_spreadsheet::writer::xlsx::write(&book, path)
        .map_err(|e| ExcelError::Write(e.to_string()))
}
