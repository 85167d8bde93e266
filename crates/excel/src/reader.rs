use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use mitsumori_core::{Cell, Grid};

use crate::ExcelError;

/// Read every sheet of a workbook into raw grids. `open_workbook_auto`
/// dispatches on the file format, covering both .xlsx and legacy .xls.
pub fn read_grids(path: &Path) -> Result<Vec<Grid>, ExcelError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ExcelError::Open(e.to_string()))?;
    let names = workbook.sheet_names().to_owned();

    let mut grids = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ExcelError::Sheet { sheet: name.clone(), message: e.to_string() })?;
        let rows: Vec<Vec<Cell>> = range
            .rows()
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();
        tracing::debug!(sheet = %name, rows = rows.len(), "sheet loaded");
        grids.push(Grid::new(name, rows));
    }
    Ok(grids)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        // Formula errors carry no recoverable value.
        Data::Error(_) => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_cell_maps_types() {
        assert_eq!(convert_cell(&Data::Empty), Cell::Empty);
        assert_eq!(convert_cell(&Data::String("品名".into())), Cell::Text("品名".into()));
        assert_eq!(convert_cell(&Data::Float(1500.0)), Cell::Number(1500.0));
        assert_eq!(convert_cell(&Data::Int(2)), Cell::Number(2.0));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = read_grids(Path::new("/nonexistent/quote.xlsx")).unwrap_err();
        assert!(matches!(err, ExcelError::Open(_)));
    }

    #[test]
    fn round_trip_through_written_workbook() {
        // Write a small sheet with umya, read it back through calamine.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote.xlsx");

        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sheet.get_cell_mut((1u32, 1u32)).set_value_string("図番");
        sheet.get_cell_mut((2u32, 1u32)).set_value_string("品名");
        sheet.get_cell_mut((3u32, 1u32)).set_value_string("金額");
        sheet.get_cell_mut((1u32, 2u32)).set_value_string("TEM2521");
        sheet.get_cell_mut((2u32, 2u32)).set_value_string("カバー");
        sheet.get_cell_mut((3u32, 2u32)).set_value_number(3000);
        umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();

        let grids = read_grids(&path).unwrap();
        assert_eq!(grids.len(), 1);
        let grid = &grids[0];
        assert_eq!(grid.name, "Sheet1");
        assert_eq!(grid.cell(0, 0), Some(&Cell::Text("図番".into())));
        assert_eq!(grid.cell(1, 2), Some(&Cell::Number(3000.0)));
    }
}
