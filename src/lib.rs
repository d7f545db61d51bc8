//! Weekly operations reporting.
//!
//! Locations submit weekly counters; [`metrics`] turns one submission into
//! ratios, [`reports`] rolls submissions up per week, group and total, and
//! [`workbook`] lays each week out as a spreadsheet sheet.

pub mod config;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
pub mod workbook;

pub use error::{ReportError, Result};
