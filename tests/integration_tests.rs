use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;
use weekly_ops_report::config::ReportConfig;
use weekly_ops_report::loader::{load_locations, load_reports};
use weekly_ops_report::reports::aggregate;
use weekly_ops_report::types::Metric;
use weekly_ops_report::workbook::{build_workbook, CellValue, WorkbookDocument};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn build(config: &ReportConfig) -> WorkbookDocument {
    let locations = load_locations(format!("{}/locations.csv", FIXTURES)).expect("locations");
    let (reports, load) = load_reports(format!("{}/reports.csv", FIXTURES)).expect("reports");
    assert_eq!(load.skipped_rows, 0);
    let buckets = aggregate(&reports, &locations, config).expect("aggregate");
    build_workbook(&buckets)
}

fn row_of(metric: Metric) -> u32 {
    2 + metric.index() as u32
}

#[test]
fn test_full_pipeline_to_xlsx() {
    let doc = build(&ReportConfig::default());
    let bytes = doc.to_xlsx().expect("encode");

    let mut wb: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).expect("open xlsx");
    assert_eq!(wb.sheet_names(), vec!["3-10-24".to_string(), "3-17-24".to_string()]);

    let range = wb.worksheet_range("3-10-24").expect("sheet");
    assert_eq!(
        range.get_value((0, 0)),
        Some(&Data::String("Week Ending March 10, 2024".into()))
    );
    // Totals, ILL, GA / SC, then Alpharetta, Marietta (GA) and Aurora, Naperville (ILL)
    let header: Vec<String> = (1..8)
        .map(|c| match range.get_value((1, c)) {
            Some(Data::String(s)) => s.clone(),
            other => panic!("unexpected header cell {:?}", other),
        })
        .collect();
    assert_eq!(
        header,
        vec!["Totals", "ILL", "GA / SC", "Alpharetta", "Marietta", "Aurora", "Naperville"]
    );

    let total_cars = row_of(Metric::TotalCars);
    assert_eq!(range.get_value((total_cars, 1)), Some(&Data::Float(230.0)));
    assert_eq!(range.get_value((total_cars, 2)), Some(&Data::Float(200.0)));
    assert_eq!(range.get_value((total_cars, 3)), Some(&Data::Float(30.0)));
    // Alpharetta never reported
    assert!(matches!(
        range.get_value((total_cars, 4)),
        None | Some(Data::Empty)
    ));

    let avg_retail = row_of(Metric::AvgRetailVisit);
    assert_eq!(range.get_value((avg_retail, 7)), Some(&Data::Float(20.0)));
    // sum of per-location ratios: 20 + 20
    assert_eq!(range.get_value((avg_retail, 2)), Some(&Data::Float(40.0)));
}

#[test]
fn test_second_week_only_has_its_reporters() {
    let doc = build(&ReportConfig::default());
    let sheet = doc.sheet("3-17-24").expect("second sheet");
    let row = &sheet.rows[row_of(Metric::TotalCars) as usize];
    assert_eq!(row[1], CellValue::Number(180.0));
    assert_eq!(row[3], CellValue::Number(0.0));
    let filled = row[4..]
        .iter()
        .filter(|c| matches!(c, CellValue::Number(_)))
        .count();
    assert_eq!(filled, 1);
}

#[test]
fn test_custom_groups_from_file() {
    let config =
        ReportConfig::load(format!("{}/groups.json", FIXTURES)).expect("group config");
    let doc = build(&config);
    let sheet = &doc.sheets[0];
    assert_eq!(sheet.rows[1][2], CellValue::Text("Midwest".into()));
    assert_eq!(sheet.rows[1][3], CellValue::Text("Southeast".into()));
}

#[test]
fn test_pipeline_is_idempotent() {
    let config = ReportConfig::default();
    assert_eq!(build(&config), build(&config));
}
