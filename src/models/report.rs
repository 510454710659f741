use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Column headers of the uploaded timesheet workbook
pub const COL_CUSTOMER_NAME: &str = "Customer Name";
pub const COL_DATE: &str = "Date";
pub const COL_HOURS: &str = "Hours";
pub const COL_MINUTES: &str = "Minutes";
pub const COL_TASK_DESCRIPTION: &str = "Task Description";

/// One decoded spreadsheet row, keyed by column header. Numeric fields
/// arrive as text and are parsed when the record becomes a [`TimesheetRow`].
pub type RowRecord = HashMap<String, String>;

/// One input timesheet record, as entered by the resource.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimesheetRow {
    pub customer_name: String,
    pub date: String,
    pub hours: f64,
    pub minutes: f64,
    pub task_description: String,
}

impl TimesheetRow {
    /// Best-effort parse of a decoded row. Missing or unparseable numeric
    /// fields default to 0, missing text fields to the empty string.
    pub fn from_record(record: &RowRecord) -> Self {
        Self {
            customer_name: text_field(record, COL_CUSTOMER_NAME),
            date: text_field(record, COL_DATE),
            hours: numeric_field(record, COL_HOURS),
            minutes: numeric_field(record, COL_MINUTES),
            task_description: text_field(record, COL_TASK_DESCRIPTION),
        }
    }
}

fn text_field(record: &RowRecord, key: &str) -> String {
    record.get(key).cloned().unwrap_or_default()
}

fn numeric_field(record: &RowRecord, key: &str) -> f64 {
    record
        .get(key)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Aggregation bucket keyed by the raw date string. Exactly one entry
/// exists per distinct date value seen in the input.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DayEntry {
    pub date: String,
    pub day_of_week: String,
    pub effort_hours: f64,
    pub task_description: String,
}

/// One output table line. Continuation lines carry only a numbered task
/// piece; serial number, date, day and effort stay blank on them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub serial_number: Option<u32>,
    pub date: String,
    pub day_of_week: String,
    pub effort_hours: Option<f64>,
    pub task_description: String,
}

/// A single grid cell of the report sheet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

/// Inclusive rectangle of cells combined visually in the output sheet.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRegion {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

/// The assembled report grid together with its layout hints, ready for
/// the codec to encode into workbook bytes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ReportSheet {
    pub rows: Vec<Vec<Cell>>,
    pub merges: Vec<MergeRegion>,
    pub column_widths: Vec<f64>,
}
