//! CSV export of report rows

use crate::api::types::{ReportResponse, TopProduct};
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Write report rows as CSV: a header row, then one line per product
///
/// Columns are the four report fields followed by any extra columns the
/// server sent, in first-seen order. A row lacking an extra column gets an
/// empty cell. Returns the number of data rows written; an empty slice
/// writes nothing.
pub fn write_csv<W: Write>(rows: &[TopProduct], writer: W) -> Result<usize, ExportError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let extra = TopProduct::extra_columns(rows);
    let mut csv_writer = csv::Writer::from_writer(writer);

    let header: Vec<&str> = TopProduct::COLUMNS.iter().copied().chain(extra.iter().copied()).collect();
    csv_writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.product.clone(),
            row.sales_count.to_string(),
            // JSON number text keeps the fractional part: 1200.0 stays "1200.0"
            Value::from(row.sales_amount).to_string(),
            row.period.clone(),
        ];
        record.extend(extra.iter().map(|column| row.extra_text(column)));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(rows.len())
}

/// Export the rows of a report to a CSV file
///
/// When the report has no rows a warning is logged and no file is created.
pub fn export_to_csv(report: &ReportResponse, path: impl AsRef<Path>) -> Result<usize, ExportError> {
    let path = path.as_ref();
    if report.data.is_empty() {
        tracing::warn!(path = %path.display(), "No data to export");
        return Ok(0);
    }

    let file = std::fs::File::create(path)?;
    let count = write_csv(&report.data, file)?;
    tracing::info!(path = %path.display(), rows = count, "Data exported");
    Ok(count)
}
