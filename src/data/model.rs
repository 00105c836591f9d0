use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// Column names of the source sheet
// ---------------------------------------------------------------------------

pub const COL_STORE: &str = "numero_loja";
pub const COL_STATUS: &str = "descricao_status";
pub const COL_ENTRY_DATE: &str = "data_entrada";
pub const COL_ISSUE_DATE: &str = "data_emissao";
pub const COL_INVOICE_NUMBER: &str = "numero_nf";
pub const COL_DAYS_BETWEEN: &str = "dias_entre_datas";

/// Required columns, in the order the filtered table shows them.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    COL_STORE,
    COL_STATUS,
    COL_ENTRY_DATE,
    COL_ISSUE_DATE,
    COL_INVOICE_NUMBER,
    COL_DAYS_BETWEEN,
];

// ---------------------------------------------------------------------------
// CellValue – a single raw spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from the workbook or CSV.
/// Extra (non-schema) columns keep this representation all the way to the table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(d) if d.time() == chrono::NaiveTime::MIN => {
                write!(f, "{}", d.date().format("%Y-%m-%d"))
            }
            CellValue::DateTime(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`, accepting numeric text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Text form used as a grouping key: whole floats lose their `.0`.
    /// Blank cells have no key.
    pub fn as_key(&self) -> Option<String> {
        if self.is_null() {
            return None;
        }
        Some(match self {
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
            CellValue::String(s) => s.trim().to_string(),
            other => other.to_string(),
        })
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// StoreId – the grouping key
// ---------------------------------------------------------------------------

/// Store identifier. Whole numbers order numerically ahead of free text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreId {
    Number(i64),
    Text(String),
}

impl StoreId {
    /// `None` for a blank cell.
    pub fn from_cell(cell: &CellValue) -> Option<Self> {
        if cell.is_null() {
            return None;
        }
        Some(match cell {
            CellValue::Integer(i) => StoreId::Number(*i),
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => StoreId::Number(*v as i64),
            CellValue::String(s) => match s.trim().parse::<i64>() {
                Ok(n) => StoreId::Number(n),
                Err(_) => StoreId::Text(s.trim().to_string()),
            },
            other => StoreId::Text(other.to_string()),
        })
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreId::Number(n) => write!(f, "{n}"),
            StoreId::Text(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// InvoiceRecord – one row of the sheet
// ---------------------------------------------------------------------------

/// One incoming-goods document line after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRecord {
    /// `None` when the cell was blank; such rows stay in the table but
    /// belong to no store group.
    pub store: Option<StoreId>,
    pub status: String,
    /// Never absent: unparseable source values are replaced with the load date.
    pub entry_date: NaiveDate,
    pub issue_date: Option<NaiveDate>,
    /// `None` when the cell was blank; not counted as a distinct invoice.
    pub invoice_number: Option<String>,
    pub days_between: Option<f64>,
    /// Non-schema columns: column_name → value.
    pub extra: BTreeMap<String, CellValue>,
}

// ---------------------------------------------------------------------------
// InvoiceDataset – the loaded snapshot
// ---------------------------------------------------------------------------

/// The full normalized dataset with pre-computed choice lists.
#[derive(Debug, Clone)]
pub struct InvoiceDataset {
    /// File the records came from (None for in-memory data).
    pub source: Option<PathBuf>,
    pub records: Vec<InvoiceRecord>,
    /// Non-schema column names, in source order.
    pub extra_columns: Vec<String>,
    pub stores: BTreeSet<StoreId>,
    pub statuses: BTreeSet<String>,
    /// How many entry dates were replaced with the load date.
    pub defaulted_entry_dates: usize,
}

impl InvoiceDataset {
    /// Build choice lists from the records.
    pub fn from_records(records: Vec<InvoiceRecord>, extra_columns: Vec<String>) -> Self {
        let stores = records.iter().filter_map(|r| r.store.clone()).collect();
        let statuses = records.iter().map(|r| r.status.clone()).collect();
        InvoiceDataset {
            source: None,
            records,
            extra_columns,
            stores,
            statuses,
            defaulted_entry_dates: 0,
        }
    }

    /// Earliest and latest entry date, if any rows exist.
    pub fn entry_date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.entry_date).min()?;
        let max = self.records.iter().map(|r| r.entry_date).max()?;
        Some((min, max))
    }

    /// File name of the source, for display.
    pub fn source_name(&self) -> Option<String> {
        self.source
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
