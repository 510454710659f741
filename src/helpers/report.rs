//! Report aggregation and layout.
//!
//! Turns parsed timesheet rows into the combined report grid: per-date
//! aggregation, date-sorted serial numbering, weekly-off counting, task
//! splitting, and the fixed header block with its merge regions.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use tracing::info;

use crate::models::report::{
    Cell, DayEntry, MergeRegion, ReportRow, ReportSheet, RowRecord, TimesheetRow,
};

// Widths for columns A..G of the output sheet
const COLUMN_WIDTHS: [f64; 7] = [5.0, 12.0, 12.0, 12.0, 17.0, 12.0, 20.0];

const TABLE_HEADER: [&str; 5] = ["Sr.No.", "DATE", "DAY", "Efforts(Hours)", "TASK DESCRIPTION"];

// Row index of the table header when the report has a single customer;
// each additional customer row shifts the table down by one.
const DATA_HEADER_ROW: usize = 8;

/// Fixed identities printed in the report header block.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    pub resource_name: String,
    pub project_manager: String,
    pub approver_name: String,
    pub submitted_by: String,
    pub role: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            resource_name: "AJIT".to_string(),
            project_manager: "VARAD".to_string(),
            approver_name: "VEDANT".to_string(),
            submitted_by: "AJIT".to_string(),
            role: "FRONTEND".to_string(),
        }
    }
}

/// Builds the combined report grid from parsed timesheet rows.
#[derive(Clone, Debug, Default)]
pub struct ReportBuilder {
    config: ReportConfig,
}

impl ReportBuilder {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Parse decoded row records into typed timesheet rows.
    ///
    /// Returns a value consumed directly by [`ReportBuilder::build_report`];
    /// no state is retained between calls.
    pub fn ingest(records: Vec<RowRecord>) -> Vec<TimesheetRow> {
        let rows: Vec<TimesheetRow> = records.iter().map(TimesheetRow::from_record).collect();
        info!("Ingested {} timesheet row(s)", rows.len());
        rows
    }

    /// Run the aggregation and formatting pipeline. Pure function of its
    /// input; the caller hands the result to the codec for encoding.
    pub fn build_report(&self, rows: &[TimesheetRow]) -> ReportSheet {
        let (mut entries, customers) = aggregate(rows);
        entries.sort_by_key(|entry| parse_report_date(&entry.date));

        let holidays = entries
            .iter()
            .filter(|entry| is_weekly_off(&entry.date))
            .count();
        let report_rows = split_task_rows(&entries);
        let labels = customer_labels(&customers);

        info!(
            "Aggregated {} day entr(ies) across {} customer(s), {} weekly off(s)",
            entries.len(),
            customers.len(),
            holidays
        );

        self.assemble(entries.len(), holidays, &labels, &report_rows)
    }

    fn assemble(
        &self,
        total_days: usize,
        holidays: usize,
        customer_labels: &[String],
        report_rows: &[ReportRow],
    ) -> ReportSheet {
        let worked_days = total_days - holidays;
        let extra_customers = customer_labels.len().saturating_sub(1);
        let data_header_row = DATA_HEADER_ROW + extra_customers;

        let config = &self.config;
        let first_customer = customer_labels.first().cloned().unwrap_or_default();

        let mut grid: Vec<Vec<Cell>> = Vec::new();
        grid.push(vec![
            text_cell("CUSTOMER NAME"),
            Cell::Empty,
            text_cell(&first_customer),
            Cell::Empty,
            text_cell("PROJECT MANAGER"),
            text_cell(&config.project_manager),
            text_cell("CALENDAR DAYS"),
            Cell::Number(total_days as f64),
        ]);
        for label in customer_labels.iter().skip(1) {
            grid.push(vec![
                Cell::Empty,
                Cell::Empty,
                text_cell(label),
                Cell::Empty,
                Cell::Empty,
                Cell::Empty,
                Cell::Empty,
                Cell::Empty,
            ]);
        }
        grid.push(vec![
            text_cell("RESOURCE NAME"),
            Cell::Empty,
            text_cell(&config.resource_name),
            Cell::Empty,
            text_cell("APPROVER NAME"),
            text_cell(&config.approver_name),
            text_cell("WEEKLY OFF/HOLIDAYS"),
            Cell::Number(holidays as f64),
        ]);
        grid.push(vec![
            text_cell("FOR MONTH"),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            text_cell("SUBMITTED BY"),
            text_cell(&config.submitted_by),
            text_cell("WORKED DAYS"),
            Cell::Number(worked_days as f64),
        ]);
        grid.push(vec![
            text_cell("ROLE"),
            Cell::Empty,
            text_cell(&config.role),
            Cell::Empty,
            text_cell("SUBMISSION DATE"),
            Cell::Empty,
            text_cell("LEAVES TAKEN"),
            Cell::Empty,
        ]);
        grid.push(vec![
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            text_cell("OVERTIME DAYS"),
            Cell::Empty,
        ]);

        while grid.len() < data_header_row {
            grid.push(Vec::new());
        }

        grid.push(TABLE_HEADER.iter().map(|title| text_cell(title)).collect());

        for row in report_rows {
            grid.push(vec![
                row.serial_number
                    .map(|serial| Cell::Number(f64::from(serial)))
                    .unwrap_or(Cell::Empty),
                text_cell(&row.date),
                text_cell(&row.day_of_week),
                row.effort_hours.map(Cell::Number).unwrap_or(Cell::Empty),
                text_cell(&row.task_description),
            ]);
        }

        ReportSheet {
            rows: grid,
            merges: merge_regions(customer_labels.len(), data_header_row, report_rows.len()),
            column_widths: COLUMN_WIDTHS.to_vec(),
        }
    }
}

/// Group rows by exact date string, summing effort and joining task
/// descriptions in row order. Also collects the distinct customer names
/// in first-seen order.
fn aggregate(rows: &[TimesheetRow]) -> (Vec<DayEntry>, Vec<String>) {
    let mut entries: Vec<DayEntry> = Vec::new();
    let mut by_date: HashMap<String, usize> = HashMap::new();
    let mut customers: Vec<String> = Vec::new();

    for row in rows {
        if !customers.contains(&row.customer_name) {
            customers.push(row.customer_name.clone());
        }

        let efforts = row.hours + row.minutes / 60.0;
        match by_date.get(&row.date) {
            Some(&index) => {
                let entry = &mut entries[index];
                entry.effort_hours += efforts;
                entry.task_description.push_str(", ");
                entry.task_description.push_str(&row.task_description);
            }
            None => {
                by_date.insert(row.date.clone(), entries.len());
                entries.push(DayEntry {
                    date: row.date.clone(),
                    day_of_week: weekday_label(&row.date),
                    effort_hours: efforts,
                    task_description: row.task_description.clone(),
                });
            }
        }
    }

    (entries, customers)
}

/// Split each entry's joined description into numbered task lines. The
/// first piece stays on the entry's own line; every further piece becomes
/// a continuation line with the other columns blank.
fn split_task_rows(entries: &[DayEntry]) -> Vec<ReportRow> {
    let mut rows = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let serial = index as u32 + 1;
        let tasks: Vec<&str> = entry
            .task_description
            .split(',')
            .map(str::trim)
            .filter(|task| !task.is_empty())
            .collect();

        if tasks.is_empty() {
            rows.push(ReportRow {
                serial_number: Some(serial),
                date: entry.date.clone(),
                day_of_week: entry.day_of_week.clone(),
                effort_hours: Some(entry.effort_hours),
                task_description: String::new(),
            });
            continue;
        }

        rows.push(ReportRow {
            serial_number: Some(serial),
            date: entry.date.clone(),
            day_of_week: entry.day_of_week.clone(),
            effort_hours: Some(entry.effort_hours),
            task_description: format!("1. {}", tasks[0]),
        });

        for (offset, task) in tasks[1..].iter().enumerate() {
            rows.push(ReportRow {
                serial_number: None,
                date: String::new(),
                day_of_week: String::new(),
                effort_hours: None,
                task_description: format!("{}. {}", offset + 2, task),
            });
        }
    }

    rows
}

fn customer_labels(customers: &[String]) -> Vec<String> {
    customers
        .iter()
        .enumerate()
        .map(|(index, name)| format!("{}. {}", index + 1, name))
        .collect()
}

fn merge_regions(
    customer_count: usize,
    data_header_row: usize,
    report_row_count: usize,
) -> Vec<MergeRegion> {
    let mut merges = Vec::new();
    let header_rows = customer_count + 4;

    // label/value pairs of the header block; the overtime line stays unmerged
    for row in 0..header_rows.saturating_sub(1) {
        merges.push(MergeRegion {
            first_row: row as u32,
            first_col: 2,
            last_row: row as u32,
            last_col: 3,
        });
    }
    for row in 0..header_rows.saturating_sub(1) {
        merges.push(MergeRegion {
            first_row: row as u32,
            first_col: 0,
            last_row: row as u32,
            last_col: 1,
        });
    }

    // task description spills across E-H on the table header and every line
    for offset in 0..=report_row_count {
        let row = (data_header_row + offset) as u32;
        merges.push(MergeRegion {
            first_row: row,
            first_col: 4,
            last_row: row,
            last_col: 7,
        });
    }

    merges
}

/// Dates are grouped and displayed as raw strings; parsing only drives
/// sorting and the weekday label. Unparseable dates sort first.
fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%y"))
        .ok()
}

fn weekday_label(raw: &str) -> String {
    match parse_report_date(raw) {
        Some(date) => date.format("%A").to_string(),
        None => "Invalid Date".to_string(),
    }
}

// Saturdays only; Sundays count as regular worked days.
fn is_weekly_off(raw: &str) -> bool {
    parse_report_date(raw)
        .map(|date| date.weekday().num_days_from_sunday() == 6)
        .unwrap_or(false)
}

fn text_cell(value: &str) -> Cell {
    if value.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(customer: &str, date: &str, hours: f64, minutes: f64, task: &str) -> TimesheetRow {
        TimesheetRow {
            customer_name: customer.to_string(),
            date: date.to_string(),
            hours,
            minutes,
            task_description: task.to_string(),
        }
    }

    fn build(rows: &[TimesheetRow]) -> ReportSheet {
        ReportBuilder::new(ReportConfig::default()).build_report(rows)
    }

    fn table_rows(sheet: &ReportSheet, data_header_row: usize) -> &[Vec<Cell>] {
        assert_eq!(
            sheet.rows[data_header_row][0],
            Cell::Text("Sr.No.".to_string())
        );
        &sheet.rows[data_header_row + 1..]
    }

    #[test]
    fn rows_sharing_a_date_merge_into_one_entry() {
        let (entries, _) = aggregate(&[
            row("X", "2024-01-01", 2.0, 30.0, "Fix bug"),
            row("X", "2024-01-01", 1.0, 0.0, "Review PR"),
        ]);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].effort_hours, 3.5);
        assert_eq!(entries[0].task_description, "Fix bug, Review PR");
        assert_eq!(entries[0].day_of_week, "Monday");
    }

    #[test]
    fn one_entry_per_distinct_date_with_exact_sums() {
        let (entries, _) = aggregate(&[
            row("X", "2024-01-01", 1.0, 15.0, "a"),
            row("X", "2024-01-02", 2.0, 0.0, "b"),
            row("X", "2024-01-01", 0.0, 45.0, "c"),
            row("X", "2024-01-03", 3.0, 30.0, "d"),
        ]);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].effort_hours, 2.0);
        assert_eq!(entries[1].effort_hours, 2.0);
        assert_eq!(entries[2].effort_hours, 3.5);
    }

    #[test]
    fn differently_formatted_dates_stay_distinct() {
        let (entries, _) = aggregate(&[
            row("X", "2024-01-01", 1.0, 0.0, "a"),
            row("X", "01/01/2024", 1.0, 0.0, "b"),
        ]);

        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn entries_appear_in_ascending_date_order() {
        let sheet = build(&[
            row("X", "2024-01-03", 1.0, 0.0, "late"),
            row("X", "2024-01-01", 1.0, 0.0, "early"),
            row("X", "2024-01-02", 1.0, 0.0, "middle"),
        ]);

        let table = table_rows(&sheet, 8);
        assert_eq!(table[0][1], Cell::Text("2024-01-01".to_string()));
        assert_eq!(table[1][1], Cell::Text("2024-01-02".to_string()));
        assert_eq!(table[2][1], Cell::Text("2024-01-03".to_string()));
        assert_eq!(table[0][0], Cell::Number(1.0));
        assert_eq!(table[1][0], Cell::Number(2.0));
        assert_eq!(table[2][0], Cell::Number(3.0));
    }

    #[test]
    fn unparseable_dates_sort_first_and_get_invalid_label() {
        let sheet = build(&[
            row("X", "2024-01-02", 1.0, 0.0, "a"),
            row("X", "someday", 1.0, 0.0, "b"),
        ]);

        let table = table_rows(&sheet, 8);
        assert_eq!(table[0][1], Cell::Text("someday".to_string()));
        assert_eq!(table[0][2], Cell::Text("Invalid Date".to_string()));
        assert_eq!(table[1][1], Cell::Text("2024-01-02".to_string()));
    }

    #[test]
    fn weekly_off_counts_saturdays_but_not_sundays() {
        // 2024-01-06 is a Saturday, 2024-01-07 a Sunday
        let sheet = build(&[
            row("X", "2024-01-05", 8.0, 0.0, "a"),
            row("X", "2024-01-06", 8.0, 0.0, "b"),
            row("X", "2024-01-07", 8.0, 0.0, "c"),
        ]);

        assert_eq!(sheet.rows[0][7], Cell::Number(3.0)); // calendar days
        assert_eq!(sheet.rows[1][7], Cell::Number(1.0)); // weekly off/holidays
        assert_eq!(sheet.rows[2][7], Cell::Number(2.0)); // worked days
    }

    #[test]
    fn multi_task_description_splits_into_numbered_lines() {
        let entries = vec![DayEntry {
            date: "2024-01-01".to_string(),
            day_of_week: "Monday".to_string(),
            effort_hours: 3.0,
            task_description: "A, B, C".to_string(),
        }];

        let rows = split_task_rows(&entries);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].task_description, "1. A");
        assert_eq!(rows[0].serial_number, Some(1));
        assert_eq!(rows[0].effort_hours, Some(3.0));
        assert_eq!(rows[1].task_description, "2. B");
        assert_eq!(rows[1].serial_number, None);
        assert_eq!(rows[1].date, "");
        assert_eq!(rows[1].effort_hours, None);
        assert_eq!(rows[2].task_description, "3. C");
    }

    #[test]
    fn empty_description_keeps_its_serial_number() {
        let entries = vec![DayEntry {
            date: "2024-01-01".to_string(),
            day_of_week: "Monday".to_string(),
            effort_hours: 1.0,
            task_description: " , ,".to_string(),
        }];

        let rows = split_task_rows(&entries);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].serial_number, Some(1));
        assert_eq!(rows[0].task_description, "");
        assert_eq!(rows[0].date, "2024-01-01");
    }

    #[test]
    fn aggregation_example_splits_into_two_report_rows() {
        let sheet = build(&[
            row("X", "2024-01-01", 2.0, 30.0, "Fix bug"),
            row("X", "2024-01-01", 1.0, 0.0, "Review PR"),
        ]);

        let table = table_rows(&sheet, 8);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0][0], Cell::Number(1.0));
        assert_eq!(table[0][3], Cell::Number(3.5));
        assert_eq!(table[0][4], Cell::Text("1. Fix bug".to_string()));
        assert_eq!(table[1][0], Cell::Empty);
        assert_eq!(table[1][4], Cell::Text("2. Review PR".to_string()));
    }

    #[test]
    fn customers_are_numbered_in_first_seen_order() {
        let (_, customers) = aggregate(&[
            row("Beta", "2024-01-01", 1.0, 0.0, "a"),
            row("Alpha", "2024-01-02", 1.0, 0.0, "b"),
            row("Beta", "2024-01-03", 1.0, 0.0, "c"),
        ]);

        assert_eq!(
            customer_labels(&customers),
            vec!["1. Beta".to_string(), "2. Alpha".to_string()]
        );
    }

    #[test]
    fn single_customer_header_block_layout() {
        let sheet = build(&[row("Acme", "2024-01-01", 1.0, 0.0, "a")]);

        assert_eq!(sheet.rows[0][0], Cell::Text("CUSTOMER NAME".to_string()));
        assert_eq!(sheet.rows[0][2], Cell::Text("1. Acme".to_string()));
        assert_eq!(sheet.rows[0][5], Cell::Text("VARAD".to_string()));
        assert_eq!(sheet.rows[1][2], Cell::Text("AJIT".to_string()));
        assert_eq!(sheet.rows[1][5], Cell::Text("VEDANT".to_string()));
        assert_eq!(sheet.rows[3][2], Cell::Text("FRONTEND".to_string()));
        assert_eq!(sheet.rows[4][6], Cell::Text("OVERTIME DAYS".to_string()));

        // three blank spacer rows, then the table header at row 8
        assert!(sheet.rows[5].is_empty());
        assert!(sheet.rows[7].is_empty());
        assert_eq!(sheet.rows[8][4], Cell::Text("TASK DESCRIPTION".to_string()));
        assert_eq!(sheet.column_widths, COLUMN_WIDTHS.to_vec());
    }

    #[test]
    fn extra_customers_shift_the_table_and_merges() {
        let sheet = build(&[
            row("Acme", "2024-01-01", 1.0, 0.0, "a"),
            row("Globex", "2024-01-02", 1.0, 0.0, "b"),
        ]);

        assert_eq!(sheet.rows[1][2], Cell::Text("2. Globex".to_string()));
        assert_eq!(sheet.rows[2][0], Cell::Text("RESOURCE NAME".to_string()));
        assert_eq!(sheet.rows[9][0], Cell::Text("Sr.No.".to_string()));

        // header pairs now merge over five rows, table merges start at row 9
        let header_rows = 2 + 4;
        let pair_merges: Vec<_> = sheet
            .merges
            .iter()
            .filter(|merge| merge.first_col == 0)
            .collect();
        assert_eq!(pair_merges.len(), header_rows - 1);
        let task_merges: Vec<_> = sheet
            .merges
            .iter()
            .filter(|merge| merge.first_col == 4)
            .collect();
        assert_eq!(task_merges[0].first_row, 9);
    }

    #[test]
    fn merge_regions_cover_pairs_and_task_span() {
        let merges = merge_regions(1, 8, 2);

        // four C-D pairs, four A-B pairs, three E-H spans
        assert_eq!(merges.len(), 11);
        assert_eq!(
            merges[0],
            MergeRegion {
                first_row: 0,
                first_col: 2,
                last_row: 0,
                last_col: 3
            }
        );
        assert_eq!(
            merges[4],
            MergeRegion {
                first_row: 0,
                first_col: 0,
                last_row: 0,
                last_col: 1
            }
        );
        let last = merges.last().unwrap();
        assert_eq!(
            *last,
            MergeRegion {
                first_row: 10,
                first_col: 4,
                last_row: 10,
                last_col: 7
            }
        );
    }

    #[test]
    fn build_report_is_idempotent() {
        let rows = vec![
            row("X", "2024-01-06", 2.0, 30.0, "a, b"),
            row("Y", "2024-01-01", 1.0, 0.0, "c"),
        ];

        let first = build(&rows);
        let second = build(&rows);

        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_still_produces_the_header_block() {
        let sheet = build(&[]);

        assert_eq!(sheet.rows[0][2], Cell::Empty);
        assert_eq!(sheet.rows[0][7], Cell::Number(0.0));
        assert_eq!(sheet.rows[8][0], Cell::Text("Sr.No.".to_string()));
        assert_eq!(sheet.rows.len(), 9);
    }

    #[test]
    fn ingest_parses_records_without_retaining_state() {
        let mut record = RowRecord::new();
        record.insert("Date".to_string(), "2024-01-01".to_string());
        record.insert("Hours".to_string(), "2".to_string());

        let rows = ReportBuilder::ingest(vec![record]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "2024-01-01");
        assert_eq!(rows[0].hours, 2.0);
    }
}
