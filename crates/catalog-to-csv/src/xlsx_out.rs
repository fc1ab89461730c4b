//! Single-sheet workbook output with the same columns as the CSV.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use crate::dataset::Dataset;
use crate::error::ExtractError;

pub const SHEET_NAME: &str = "Products";

const PAGE_COLUMN: u16 = 1;

fn build_workbook(dataset: &Dataset) -> Result<Workbook, ExtractError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    for (column, name) in (0u16..).zip(dataset.headers()) {
        worksheet.write_string_with_format(0, column, name, &header)?;
    }

    for (row, (record, cells)) in (1u32..).zip(dataset.records().iter().zip(dataset.rows())) {
        for (column, cell) in (0u16..).zip(cells) {
            if column == PAGE_COLUMN {
                worksheet.write_number(row, column, f64::from(record.page))?;
            } else if !cell.is_empty() {
                worksheet.write_string(row, column, cell)?;
            }
        }
    }
    worksheet.set_freeze_panes(1, 0)?;

    Ok(workbook)
}

pub(crate) fn write_xlsx(path: &Path, dataset: &Dataset) -> Result<(), ExtractError> {
    let mut workbook = build_workbook(dataset)?;
    workbook.save(path)?;
    Ok(())
}

pub(crate) fn write_xlsx_to_buffer(dataset: &Dataset) -> Result<Vec<u8>, ExtractError> {
    let mut workbook = build_workbook(dataset)?;
    Ok(workbook.save_to_buffer()?)
}
