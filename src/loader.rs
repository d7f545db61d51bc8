use crate::error::{ReportError, Result};
use crate::types::{Location, RawReport, WeeklyReport};
use crate::util::{parse_date_safe, week_end_for};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
}

enum InputFormat {
    Csv,
    Json,
}

fn input_format(path: &Path) -> Result<InputFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => Ok(InputFormat::Csv),
        Some("json") => Ok(InputFormat::Json),
        _ => Err(ReportError::UnsupportedInput(format!(
            "{} (expected .csv or .json)",
            path.display()
        ))),
    }
}

/// Deserialize every row, keeping per-row failures instead of aborting.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<Result<T>>> {
    match input_format(path)? {
        InputFormat::Csv => {
            let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
            Ok(rdr
                .deserialize::<T>()
                .map(|r| r.map_err(ReportError::from))
                .collect())
        }
        InputFormat::Json => {
            let values: Vec<serde_json::Value> =
                serde_json::from_reader(BufReader::new(File::open(path)?))?;
            Ok(values
                .into_iter()
                .map(|v| serde_json::from_value(v).map_err(ReportError::from))
                .collect())
        }
    }
}

/// Location catalog. Unlike reports, a malformed catalog row is an error:
/// silently losing a location would misattribute its reports.
pub fn load_locations(path: impl AsRef<Path>) -> Result<Vec<Location>> {
    let path = path.as_ref();
    let locations = read_rows::<Location>(path)?
        .into_iter()
        .collect::<Result<Vec<_>>>()?;
    info!(path = %path.display(), count = locations.len(), "Loaded locations");
    Ok(locations)
}

pub fn load_reports(path: impl AsRef<Path>) -> Result<(Vec<WeeklyReport>, LoadReport)> {
    let path = path.as_ref();
    let (reports, load_report) = clean_reports(read_rows::<RawReport>(path)?);
    info!(
        path = %path.display(),
        total = load_report.total_rows,
        loaded = load_report.loaded_rows,
        skipped = load_report.skipped_rows,
        "Loaded reports"
    );
    Ok((reports, load_report))
}

/// Turn raw rows into reports. Rows without a usable location id or start
/// date are skipped and counted.
pub fn clean_reports(rows: Vec<Result<RawReport>>) -> (Vec<WeeklyReport>, LoadReport) {
    let mut total_rows = 0usize;
    let mut skipped_rows = 0usize;
    let mut reports = Vec::new();

    for (line, result) in rows.into_iter().enumerate() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row = line + 1, error = %e, "Skipping unreadable report row");
                skipped_rows += 1;
                continue;
            }
        };

        let Some(location_id) = row.location_id.or(row.location.as_ref().map(|l| l.id)) else {
            warn!(row = line + 1, "Skipping report without a location");
            skipped_rows += 1;
            continue;
        };
        let Some(week_start_date) = parse_date_safe(row.week_start_date.as_deref()) else {
            warn!(row = line + 1, "Skipping report without a valid week start date");
            skipped_rows += 1;
            continue;
        };
        let week_end_date = parse_date_safe(row.week_end_date.as_deref())
            .unwrap_or_else(|| week_end_for(week_start_date));

        reports.push(WeeklyReport {
            location_id,
            week_start_date,
            week_end_date,
            fields: row.fields(),
        });
    }

    let load_report = LoadReport {
        total_rows,
        loaded_rows: reports.len(),
        skipped_rows,
    };
    (reports, load_report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_reports_from_csv() {
        let path = temp_file(
            "weekly_ops_report_loader_reports.csv",
            "locationId,weekStartDate,weekEndDate,carCountMonFri,carCountSatSun,retailRevenueMonFri\n\
             1,2024-03-04,2024-03-10,100,50,\"1,000.50\"\n\
             2,2024-03-04,,12,,\n\
             ,2024-03-04,2024-03-10,5,5,5\n\
             3,not-a-date,2024-03-10,5,5,5\n",
        );
        let (reports, load) = load_reports(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(
            load,
            LoadReport {
                total_rows: 4,
                loaded_rows: 2,
                skipped_rows: 2
            }
        );
        assert_eq!(reports[0].fields.car_count_mon_fri, "100");
        assert_eq!(reports[0].fields.retail_revenue_mon_fri, "1,000.50");
        assert_eq!(reports[0].fields.staff_hours_mon_fri, "");
        // missing end date is derived from the start
        assert_eq!(
            reports[1].week_end_date,
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
    }

    #[test]
    fn loads_reports_from_json_with_numbers_and_embedded_location() {
        let path = temp_file(
            "weekly_ops_report_loader_reports.json",
            r#"[
                {"location": {"id": 7, "name": "Marietta", "state": "GA"},
                 "weekStartDate": "2024-03-04T00:00:00.000Z",
                 "weekEndDate": "2024-03-10T00:00:00.000Z",
                 "carCountMonFri": 100, "totalRevenueMonFri": 2500.75,
                 "staffHoursMonFri": "20"},
                {"locationId": "oops", "weekStartDate": "2024-03-04"}
            ]"#,
        );
        let (reports, load) = load_reports(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(load.loaded_rows, 1);
        assert_eq!(load.skipped_rows, 1);
        assert_eq!(reports[0].location_id, 7);
        assert_eq!(reports[0].fields.car_count_mon_fri, "100");
        assert_eq!(reports[0].fields.total_revenue_mon_fri, "2500.75");
        assert_eq!(reports[0].fields.staff_hours_mon_fri, "20");
    }

    #[test]
    fn loads_locations_from_csv() {
        let path = temp_file(
            "weekly_ops_report_loader_locations.csv",
            "id,name,state\n1,Naperville,ILL\n2,Marietta,GA\n",
        );
        let locations = load_locations(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[1].state, "GA");
    }

    #[test]
    fn malformed_location_row_is_an_error() {
        let path = temp_file(
            "weekly_ops_report_loader_bad_locations.csv",
            "id,name,state\nabc,Naperville,ILL\n",
        );
        let result = load_locations(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ReportError::Csv(_))));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_locations("locations.xlsx").unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedInput(_)));
    }
}
