use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use std::io::Cursor;
use thiserror::Error;
use tracing::info;

use crate::models::report::{Cell, ReportSheet, RowRecord};

/// Filename the exported workbook is served under.
pub const REPORT_FILE_NAME: &str = "CombinedReport.xlsx";

const SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to read workbook: {0}")]
    Read(#[from] calamine::XlsxError),
    #[error("failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
    #[error("workbook contains no sheets")]
    NoSheets,
}

/// Decode uploaded workbook bytes into header-keyed row records.
///
/// The first worksheet is read; its first row supplies the column headers
/// and every following row becomes one record. Empty cells are skipped so
/// absent values stay absent from the record.
pub fn decode(bytes: &[u8]) -> Result<Vec<RowRecord>, CodecError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(CodecError::NoSheets)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(data_to_string).collect(),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for row in rows {
        let mut record = RowRecord::new();
        for (header, cell) in headers.iter().zip(row) {
            if header.is_empty() || matches!(cell, Data::Empty) {
                continue;
            }
            record.insert(header.clone(), data_to_string(cell));
        }
        records.push(record);
    }

    info!(
        "Decoded {} record(s) from sheet '{}'",
        records.len(),
        sheet_name
    );
    Ok(records)
}

fn data_to_string(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => value
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| value.as_f64().to_string()),
        other => other.to_string(),
    }
}

/// Encode a [`ReportSheet`] into workbook bytes.
///
/// Merge regions are laid down first with an empty string, then the cell
/// values are written over their top-left corners, then the column widths.
pub fn encode(sheet: &ReportSheet) -> Result<Vec<u8>, CodecError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let merge_format = Format::new();
    for merge in &sheet.merges {
        worksheet.merge_range(
            merge.first_row,
            merge.first_col,
            merge.last_row,
            merge.last_col,
            "",
            &merge_format,
        )?;
    }

    for (row_index, row) in sheet.rows.iter().enumerate() {
        for (col_index, cell) in row.iter().enumerate() {
            match cell {
                Cell::Empty => {}
                Cell::Text(value) => {
                    worksheet.write_string(row_index as u32, col_index as u16, value)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row_index as u32, col_index as u16, *value)?;
                }
            }
        }
    }

    for (col_index, width) in sheet.column_widths.iter().enumerate() {
        worksheet.set_column_width(col_index as u16, *width)?;
    }

    let bytes = workbook.save_to_buffer()?;
    info!("Encoded report workbook, size: {} bytes", bytes.len());
    Ok(bytes)
}
