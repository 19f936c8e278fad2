// Spreadsheet export of typed sheet rows through rust_xlsxwriter.
use crate::error::EngineError;
use rust_xlsxwriter::{Workbook, Worksheet};
use shared::models::SheetCell;
use std::path::Path;

/// File name used for spreadsheet downloads.
pub const XLSX_FILE_NAME: &str = "edited_file.xlsx";
pub const SHEET_NAME: &str = "Sheet1";

/// Builds a single-sheet workbook. Numbers are written as numeric cells and
/// empty text is left blank.
pub fn build_workbook(rows: &[Vec<SheetCell>]) -> Result<Workbook, EngineError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name(SHEET_NAME)?;
    write_rows(worksheet, rows)?;
    Ok(workbook)
}

pub fn write_xlsx(rows: &[Vec<SheetCell>], path: &Path) -> Result<(), EngineError> {
    let mut workbook = build_workbook(rows)?;
    workbook.save(path)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "Wrote XLSX workbook");
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<SheetCell>]) -> Result<(), EngineError> {
    for (row_idx, row) in rows.iter().enumerate() {
        let row32 = u32::try_from(row_idx)
            .map_err(|_| EngineError::ProcessingError(format!("Row {} does not fit in a worksheet", row_idx)))?;
        for (col_idx, cell) in row.iter().enumerate() {
            let col16 = u16::try_from(col_idx)
                .map_err(|_| EngineError::ProcessingError(format!("Column {} does not fit in a worksheet", col_idx)))?;
            match cell {
                SheetCell::Number(value) => {
                    worksheet.write_number(row32, col16, *value)?;
                }
                SheetCell::Text(text) if text.is_empty() => {}
                SheetCell::Text(text) => {
                    worksheet.write_string(row32, col16, text)?;
                }
            }
        }
    }
    Ok(())
}
