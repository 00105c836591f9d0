use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use super::model::{InvoiceDataset, InvoiceRecord, REQUIRED_COLUMNS};

/// Write the visible rows as CSV: schema columns first, then the extra
/// columns in source order.
pub fn export_csv<W: Write>(dataset: &InvoiceDataset, visible: &[usize], writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let header = REQUIRED_COLUMNS
        .iter()
        .copied()
        .chain(dataset.extra_columns.iter().map(String::as_str));
    out.write_record(header).context("writing CSV header")?;

    for &i in visible {
        let record = &dataset.records[i];
        out.write_record(row_cells(record, &dataset.extra_columns))
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    out.flush().context("flushing CSV")?;
    Ok(())
}

/// Display text of every column of a record, in table order.
pub fn row_cells(record: &InvoiceRecord, extra_columns: &[String]) -> Vec<String> {
    let mut cells = vec![
        record.store.as_ref().map(|s| s.to_string()).unwrap_or_default(),
        record.status.clone(),
        record.entry_date.format("%Y-%m-%d").to_string(),
        record
            .issue_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        record.invoice_number.clone().unwrap_or_default(),
        record.days_between.map(|d| d.to_string()).unwrap_or_default(),
    ];
    cells.extend(
        extra_columns
            .iter()
            .map(|c| record.extra.get(c).map(|v| v.to_string()).unwrap_or_default()),
    );
    cells
}

/// Sub-directory holding exports. The source scan only looks at regular
/// files directly in its directory, so exports are never picked up as a source.
pub const EXPORT_SUBDIR: &str = "filtrados";

/// `<dir>/filtrados/filtrado_<timestamp>.csv`
pub fn export_path(dir: &Path, now: NaiveDateTime) -> PathBuf {
    dir.join(EXPORT_SUBDIR)
        .join(format!("filtrado_{}.csv", now.format("%Y%m%d_%H%M%S")))
}

/// Export the visible rows to a new file and return its path.
pub fn export_to_file(dataset: &InvoiceDataset, visible: &[usize], path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    export_csv(dataset, visible, std::io::BufWriter::new(file))?;
    Ok(path.to_path_buf())
}
