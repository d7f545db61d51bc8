use chrono::NaiveDate;
use thiserror::Error;

/// Everything that can go wrong between loading input and writing a workbook.
///
/// Metric calculation itself never fails; malformed counters degrade to zero.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("location catalog is empty")]
    EmptyCatalog,

    #[error("report for week ending {week_end} references unknown location id {location_id}")]
    UnknownLocation { location_id: i64, week_end: NaiveDate },

    #[error("invalid group configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("workbook encoding failed: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
