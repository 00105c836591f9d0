use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;

use super::model::{
    CellValue, InvoiceDataset, InvoiceRecord, StoreId, COL_DAYS_BETWEEN, COL_ENTRY_DATE,
    COL_INVOICE_NUMBER, COL_ISSUE_DATE, COL_STATUS, COL_STORE, REQUIRED_COLUMNS,
};

// ---------------------------------------------------------------------------
// Errors and intermediate table
// ---------------------------------------------------------------------------

/// The source parsed but does not have the shape the dashboard needs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing required column(s): {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },
    #[error("the sheet has no header row")]
    EmptySheet,
    #[error("workbook {0} has no worksheets")]
    NoWorksheet(String),
}

/// Header row plus data rows, before any typing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Split a grid into header + rows. Leading blank rows are skipped; the
    /// first non-blank row is the header.
    fn from_grid(grid: impl IntoIterator<Item = Vec<CellValue>>) -> Result<Self, SchemaError> {
        let mut grid = grid
            .into_iter()
            .filter(|row| row.iter().any(|c| !c.is_null()));
        let headers = grid
            .next()
            .ok_or(SchemaError::EmptySheet)?
            .iter()
            .map(|c| c.to_string().trim().to_string())
            .collect();
        Ok(RawTable {
            headers,
            rows: grid.collect(),
        })
    }
}

/// Parsing knobs that come from configuration.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// Read `03/04/2024` as 3 April rather than March 4.
    pub day_first: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self { day_first: true }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read, validate and normalize the source in one go.
pub fn load_dataset(path: &Path, options: NormalizeOptions, today: NaiveDate) -> Result<InvoiceDataset> {
    let raw = load_file(path)?;
    let mut dataset = normalize(raw, options, today)
        .with_context(|| format!("validating {}", path.display()))?;
    dataset.source = Some(path.to_path_buf());
    Ok(dataset)
}

/// Load the raw table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet
/// * `.csv` – header row first, comma separated
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Validate the schema and type every row.
///
/// Entry dates that are missing or unparseable become `today`; issuance dates
/// stay `None`. Columns outside the schema are carried along untouched.
pub fn normalize(raw: RawTable, options: NormalizeOptions, today: NaiveDate) -> Result<InvoiceDataset, SchemaError> {
    let position = |name: &str| raw.headers.iter().position(|h| h == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| position(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns { columns: missing });
    }
    // Every required column was found above.
    let idx = |name: &str| position(name).unwrap_or_default();
    let (store_i, status_i, entry_i, issue_i, number_i, days_i) = (
        idx(COL_STORE),
        idx(COL_STATUS),
        idx(COL_ENTRY_DATE),
        idx(COL_ISSUE_DATE),
        idx(COL_INVOICE_NUMBER),
        idx(COL_DAYS_BETWEEN),
    );

    let mut extra_cols: Vec<(usize, String)> = Vec::new();
    for (i, name) in raw.headers.iter().enumerate() {
        let taken = REQUIRED_COLUMNS.contains(&name.as_str())
            || name.is_empty()
            || extra_cols.iter().any(|(_, n)| n == name);
        if !taken {
            extra_cols.push((i, name.clone()));
        }
    }

    let null = CellValue::Null;
    let mut defaulted = 0;
    let mut records = Vec::with_capacity(raw.rows.len());

    for row in &raw.rows {
        let cell = |i: usize| row.get(i).unwrap_or(&null);

        let entry_date = match parse_date(cell(entry_i), options.day_first) {
            Some(d) => d,
            None => {
                defaulted += 1;
                today
            }
        };

        let extra: BTreeMap<String, CellValue> = extra_cols
            .iter()
            .map(|(i, name)| (name.clone(), cell(*i).clone()))
            .collect();

        records.push(InvoiceRecord {
            store: StoreId::from_cell(cell(store_i)),
            status: cell(status_i).to_string().trim().to_string(),
            entry_date,
            issue_date: parse_date(cell(issue_i), options.day_first),
            invoice_number: cell(number_i).as_key(),
            days_between: cell(days_i).as_f64(),
            extra,
        });
    }

    if defaulted > 0 {
        log::warn!("{defaulted} row(s) without a valid {COL_ENTRY_DATE}; using {today}");
    }

    let mut dataset = InvoiceDataset::from_records(
        records,
        extra_cols.into_iter().map(|(_, n)| n).collect(),
    );
    dataset.defaulted_entry_dates = defaulted;
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SchemaError::NoWorksheet(path.display().to_string()))?
        .with_context(|| format!("reading first worksheet of {}", path.display()))?;

    let grid = range
        .rows()
        .map(|r| r.iter().map(cell_from_data).collect::<Vec<_>>());
    Ok(RawTable::from_grid(grid)?)
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => CellValue::String(s.clone()),
        Data::Float(v) => CellValue::Float(*v),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        // `as_datetime` honours the workbook's 1900/1904 date system.
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => CellValue::DateTime(d),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one invoice line per record.
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;

    let mut grid = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        grid.push(record.iter().map(guess_cell_type).collect::<Vec<_>>());
    }
    Ok(RawTable::from_grid(grid)?)
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Date coercion
// ---------------------------------------------------------------------------

const ISO_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];
const DAY_FIRST_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const MONTH_FIRST_FORMATS: [&str; 3] = ["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y"];

/// Coerce a cell to a calendar date; `None` when it cannot be read as one.
pub fn parse_date(cell: &CellValue, day_first: bool) -> Option<NaiveDate> {
    match cell {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Float(v) => serial_to_datetime(*v).map(|d| d.date()),
        CellValue::Integer(i) => serial_to_datetime(*i as f64).map(|d| d.date()),
        CellValue::String(s) => parse_date_text(s.trim(), day_first),
        CellValue::Bool(_) | CellValue::Null => None,
    }
}

fn parse_date_text(s: &str, day_first: bool) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in ISO_DATETIME_FORMATS {
        if let Ok(d) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(d.date());
        }
    }
    // Day-month-year text may carry a trailing time; only the date part counts.
    // The preferred order wins; the other one still reads dates it cannot
    // (e.g. `12/25/2024` when day-first).
    let date_part = s.split_whitespace().next().unwrap_or(s);
    let (preferred, fallback) = if day_first {
        (DAY_FIRST_FORMATS, MONTH_FIRST_FORMATS)
    } else {
        (MONTH_FIRST_FORMATS, DAY_FIRST_FORMATS)
    };
    preferred
        .iter()
        .chain(fallback.iter())
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Spreadsheet serial date (days since 1899-12-30) to a timestamp.
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    // 2958465 is 9999-12-31, the last date a spreadsheet can hold.
    if !serial.is_finite() || !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let secs = (serial.fract() * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::days(days) + Duration::seconds(secs))
}
