//! Weekly rollups.
//!
//! Reports are bucketed by week-ending date. Inside a bucket every location
//! gets its metric values from [`metrics::calculate`], and group and total
//! columns are plain sums of those per-location values. For the ratio rows
//! that makes the rollup a sum of ratios, not a blended rate.

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::metrics::{self, ParsedInputs};
use crate::types::{
    AvailabilityRow, Location, Metric, ReportFields, WeekSummaryRow, WeeklyReport,
};
use crate::util::{format_int, format_number, sheet_name};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

/// One value per sheet row, indexed by [`Metric::index`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricValues([f64; Metric::COUNT]);

impl Default for MetricValues {
    fn default() -> Self {
        MetricValues([0.0; Metric::COUNT])
    }
}

impl MetricValues {
    /// Raw counters echoed as parsed, derived rows freshly calculated. Any
    /// derived value stored alongside the report is never consulted.
    pub fn from_fields(fields: &ReportFields) -> Self {
        let inputs = ParsedInputs::from_fields(fields);
        let derived = metrics::calculate_parsed(&inputs);
        let mut values = MetricValues::default();
        for metric in Metric::ALL {
            values.0[metric.index()] = match metric.input() {
                Some(field) => inputs.value(field),
                None => derived.get(metric).unwrap_or(f64::NAN),
            };
        }
        values
    }

    pub fn get(&self, metric: Metric) -> f64 {
        self.0[metric.index()]
    }

    /// Numeric cell value, or `None` when the value is not a finite number.
    pub fn cell(&self, metric: Metric) -> Option<f64> {
        Some(self.get(metric)).filter(|v| v.is_finite())
    }

    fn accumulate(&mut self, other: &MetricValues) {
        for (acc, v) in self.0.iter_mut().zip(other.0.iter()) {
            *acc += v;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationColumn {
    pub location: Location,
    /// `None` when the location did not submit for this week.
    pub values: Option<MetricValues>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupColumn {
    pub key: String,
    pub label: String,
    pub values: MetricValues,
}

/// Everything needed to render one week's sheet, columns already in order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationBucket {
    pub week_end: NaiveDate,
    pub totals: MetricValues,
    pub groups: Vec<GroupColumn>,
    pub locations: Vec<LocationColumn>,
}

impl AggregationBucket {
    pub fn location(&self, name: &str) -> Option<&LocationColumn> {
        self.locations.iter().find(|c| c.location.name == name)
    }

    pub fn group(&self, key: &str) -> Option<&GroupColumn> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn reporting_count(&self) -> usize {
        self.locations.iter().filter(|c| c.values.is_some()).count()
    }
}

/// Catalog sorted the way location columns appear: by state, then by name.
fn column_order(locations: &[Location]) -> Vec<Location> {
    let mut sorted = locations.to_vec();
    sorted.sort_by(|a, b| a.state.cmp(&b.state).then_with(|| a.name.cmp(&b.name)));
    sorted
}

/// Build one bucket per distinct week-ending date, oldest week first.
///
/// Fails if the catalog is empty or a report points at a location the
/// catalog does not contain.
pub fn aggregate(
    reports: &[WeeklyReport],
    locations: &[Location],
    config: &ReportConfig,
) -> Result<Vec<AggregationBucket>> {
    if locations.is_empty() {
        return Err(ReportError::EmptyCatalog);
    }
    config.validate()?;

    let known: HashSet<i64> = locations.iter().map(|l| l.id).collect();
    let mut by_week: BTreeMap<NaiveDate, Vec<&WeeklyReport>> = BTreeMap::new();
    for r in reports {
        if !known.contains(&r.location_id) {
            return Err(ReportError::UnknownLocation {
                location_id: r.location_id,
                week_end: r.week_end_date,
            });
        }
        by_week.entry(r.week_end_date).or_default().push(r);
    }

    let columns = column_order(locations);
    let buckets: Vec<AggregationBucket> = by_week
        .into_iter()
        .map(|(week_end, week_reports)| build_bucket(week_end, &week_reports, &columns, config))
        .collect();

    info!(
        reports = reports.len(),
        locations = locations.len(),
        weeks = buckets.len(),
        "Aggregated weekly reports"
    );
    Ok(buckets)
}

fn build_bucket(
    week_end: NaiveDate,
    reports: &[&WeeklyReport],
    columns: &[Location],
    config: &ReportConfig,
) -> AggregationBucket {
    let mut per_location: HashMap<i64, MetricValues> = HashMap::new();
    for r in reports {
        let values = MetricValues::from_fields(&r.fields);
        if per_location.insert(r.location_id, values).is_some() {
            warn!(
                location_id = r.location_id,
                %week_end,
                "Duplicate report for location; keeping the later one"
            );
        }
    }

    let mut totals = MetricValues::default();
    let mut groups: Vec<GroupColumn> = config
        .groups
        .iter()
        .map(|g| GroupColumn {
            key: g.key.clone(),
            label: g.label.clone(),
            values: MetricValues::default(),
        })
        .collect();

    let locations: Vec<LocationColumn> = columns
        .iter()
        .map(|location| {
            let values = per_location.get(&location.id).copied();
            if let Some(v) = &values {
                totals.accumulate(v);
                if let Some(idx) = config.group_for_state(&location.state) {
                    groups[idx].values.accumulate(v);
                }
            }
            LocationColumn {
                location: location.clone(),
                values,
            }
        })
        .collect();

    debug!(%week_end, reporting = per_location.len(), "Built weekly bucket");
    AggregationBucket {
        week_end,
        totals,
        groups,
        locations,
    }
}

/// Reports whose week ends inside the inclusive range. Open ends are unbounded.
pub fn select_weeks(
    reports: &[WeeklyReport],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<WeeklyReport> {
    reports
        .iter()
        .filter(|r| from.map_or(true, |f| r.week_end_date >= f))
        .filter(|r| to.map_or(true, |t| r.week_end_date <= t))
        .cloned()
        .collect()
}

/// Whether a location already submitted for the week starting `week_start`.
pub fn report_exists(reports: &[WeeklyReport], location_id: i64, week_start: NaiveDate) -> bool {
    reports
        .iter()
        .any(|r| r.location_id == location_id && r.week_start_date == week_start)
}

/// Per-location submission status for one week, in catalog order.
pub fn report_availability(
    reports: &[WeeklyReport],
    locations: &[Location],
    week_start: NaiveDate,
) -> Vec<AvailabilityRow> {
    locations
        .iter()
        .map(|l| AvailabilityRow {
            location: l.name.clone(),
            state: l.state.clone(),
            available: report_exists(reports, l.id, week_start),
        })
        .collect()
}

pub fn summarize(buckets: &[AggregationBucket]) -> Vec<WeekSummaryRow> {
    buckets
        .iter()
        .map(|b| WeekSummaryRow {
            sheet: sheet_name(b.week_end),
            week_ending: b.week_end,
            locations_reporting: b.reporting_count(),
            total_cars: format_int(b.totals.get(Metric::TotalCars) as i64),
            total_revenue: format_number(b.totals.get(Metric::TotalRevenue), 2),
        })
        .collect()
}
