//! Weekly workbook layout and xlsx encoding.
//!
//! Layout of every sheet:
//!
//! ```text
//! | Week Ending March 10, 2024 |        |     |         |          |        |
//! |                            | Totals | ILL | GA / SC | Marietta | Aurora | ...
//! | Car Count Mon - Fri        | 180    | 150 | 30      | 30       | 50     | ...
//! | ...                        |        |     |         |          |        |
//! ```
//!
//! The layout is built as plain data first ([`WorkbookDocument`]) and only
//! then encoded, so it can be inspected without reading an xlsx file back.

use crate::error::Result;
use crate::reports::{AggregationBucket, MetricValues};
use crate::types::Metric;
use crate::util::{long_date, sheet_name};
use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, info};

const MIN_NUMERIC_WIDTH: f64 = 10.0;
const MIN_LOCATION_WIDTH: f64 = 15.0;
const LABEL_PADDING: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Blank,
    Text(String),
    Number(f64),
}

impl CellValue {
    fn number(v: Option<f64>) -> Self {
        v.map_or(CellValue::Blank, CellValue::Number)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
    pub bold_rows: Vec<usize>,
    /// Width per column, in characters.
    pub column_widths: Vec<f64>,
}

impl SheetData {
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row)?.get(col)
    }

    pub fn is_bold(&self, row: usize) -> bool {
        self.bold_rows.contains(&row)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkbookDocument {
    pub sheets: Vec<SheetData>,
}

impl WorkbookDocument {
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetData> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Encode as xlsx bytes.
    ///
    /// The xlsx format needs at least one worksheet, so an empty document
    /// encodes with the writer's default blank sheet. Check [`is_empty`]
    /// first if that matters.
    ///
    /// [`is_empty`]: WorkbookDocument::is_empty
    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;

            for (col, width) in sheet.column_widths.iter().enumerate() {
                worksheet.set_column_width(col as u16, *width)?;
            }

            for (r, row) in sheet.rows.iter().enumerate() {
                let is_bold = sheet.is_bold(r);
                // rust_xlsxwriter uses 0-based row/col as u32/u16
                let row32 = r as u32;
                for (c, cell) in row.iter().enumerate() {
                    let col16 = c as u16;
                    match (cell, is_bold) {
                        (CellValue::Blank, true) => {
                            worksheet.write_blank(row32, col16, &bold)?;
                        }
                        (CellValue::Blank, false) => {}
                        (CellValue::Text(s), true) => {
                            worksheet.write_string_with_format(row32, col16, s, &bold)?;
                        }
                        (CellValue::Text(s), false) => {
                            worksheet.write_string(row32, col16, s)?;
                        }
                        (CellValue::Number(n), true) => {
                            worksheet.write_number_with_format(row32, col16, *n, &bold)?;
                        }
                        (CellValue::Number(n), false) => {
                            worksheet.write_number(row32, col16, *n)?;
                        }
                    }
                }
            }
        }

        let buffer = workbook.save_to_buffer()?;
        info!(
            sheets = self.sheets.len(),
            bytes = buffer.len(),
            "Encoded workbook"
        );
        Ok(buffer)
    }
}

/// Lay out one week's bucket as a sheet.
pub fn build_sheet(bucket: &AggregationBucket) -> SheetData {
    let mut rows = Vec::with_capacity(Metric::COUNT + 2);

    rows.push(vec![CellValue::Text(format!(
        "Week Ending {}",
        long_date(bucket.week_end)
    ))]);

    let mut header = vec![CellValue::Blank, CellValue::Text("Totals".into())];
    header.extend(bucket.groups.iter().map(|g| CellValue::Text(g.label.clone())));
    header.extend(
        bucket
            .locations
            .iter()
            .map(|c| CellValue::Text(c.location.name.clone())),
    );
    rows.push(header);

    for metric in Metric::ALL {
        let value = |v: &MetricValues| CellValue::number(v.cell(metric));
        let mut row = vec![CellValue::Text(metric.label().into()), value(&bucket.totals)];
        row.extend(bucket.groups.iter().map(|g| value(&g.values)));
        row.extend(
            bucket
                .locations
                .iter()
                .map(|c| c.values.as_ref().map_or(CellValue::Blank, value)),
        );
        rows.push(row);
    }

    let label_width = Metric::ALL
        .iter()
        .map(|m| m.label().chars().count())
        .max()
        .unwrap_or(0) as f64
        + LABEL_PADDING;
    let mut column_widths = vec![label_width, MIN_NUMERIC_WIDTH];
    column_widths.extend(
        bucket
            .groups
            .iter()
            .map(|g| (g.label.chars().count() as f64).max(MIN_NUMERIC_WIDTH)),
    );
    column_widths.extend(
        bucket
            .locations
            .iter()
            .map(|c| (c.location.name.chars().count() as f64).max(MIN_LOCATION_WIDTH)),
    );

    let name = sheet_name(bucket.week_end);
    debug!(sheet = %name, columns = column_widths.len(), "Built sheet");
    SheetData {
        name,
        rows,
        bold_rows: vec![0, 1],
        column_widths,
    }
}

/// One sheet per bucket, in bucket order. No buckets gives an empty document.
pub fn build_workbook(buckets: &[AggregationBucket]) -> WorkbookDocument {
    WorkbookDocument {
        sheets: buckets.iter().map(build_sheet).collect(),
    }
}
