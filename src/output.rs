use crate::error::Result;
use crate::types::MetricPreviewRow;
use crate::util::download_file_name;
use crate::workbook::WorkbookDocument;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

/// Write the encoded workbook as `Reports_<today>.xlsx` inside `dir`.
pub fn write_workbook(dir: &Path, today: NaiveDate, doc: &WorkbookDocument) -> Result<PathBuf> {
    let path = dir.join(download_file_name(today));
    let bytes = doc.to_xlsx()?;
    std::fs::write(&path, &bytes)?;
    info!(path = %path.display(), sheets = doc.sheets.len(), "Wrote workbook");
    Ok(path)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    match render_table(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

pub fn preview_metrics(rows: &[MetricPreviewRow]) {
    println!("Calculated Metrics\n");
    preview_table_rows(rows, rows.len());
}
