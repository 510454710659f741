//! Combined Report Utility Library
//!
//! This library provides functionality for ingesting uploaded timesheet
//! workbooks, aggregating effort per date, and generating a formatted
//! combined report workbook for download.

pub mod helpers;
pub mod models;
pub mod service;

pub use service::{InputError, ReportService};

// Re-export key types for convenience
pub use helpers::codec::{CodecError, REPORT_FILE_NAME};
pub use helpers::report::{ReportBuilder, ReportConfig};
pub use models::report::{
    Cell, DayEntry, MergeRegion, ReportRow, ReportSheet, RowRecord, TimesheetRow,
};
