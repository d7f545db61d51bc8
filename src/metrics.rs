//! Weekly counter arithmetic.
//!
//! This is the only place the ratio formulas live. The live preview and the
//! spreadsheet export both call [`calculate`], so the two can never disagree.

use crate::types::{DerivedMetrics, InputField, Metric, MetricPreviewRow, ReportFields};
use crate::util::{format_int, format_number, parse_amount, parse_count, round2};

/// Counters after lenient parsing. Counts are whole numbers, money and hours
/// are not.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParsedInputs {
    pub car_count_mon_fri: i64,
    pub car_count_sat_sun: i64,
    pub retail_car_count_mon_fri: i64,
    pub retail_car_count_sat_sun: i64,
    pub retail_revenue_mon_fri: f64,
    pub retail_revenue_sat_sun: f64,
    pub total_revenue_mon_fri: f64,
    pub total_revenue_sat_sun: f64,
    pub staff_hours_mon_fri: f64,
    pub staff_hours_sat_sun: f64,
    pub total_club_plans_sold: i64,
    pub total_club_plan_members: i64,
}

impl ParsedInputs {
    pub fn from_fields(fields: &ReportFields) -> Self {
        ParsedInputs {
            car_count_mon_fri: parse_count(&fields.car_count_mon_fri),
            car_count_sat_sun: parse_count(&fields.car_count_sat_sun),
            retail_car_count_mon_fri: parse_count(&fields.retail_car_count_mon_fri),
            retail_car_count_sat_sun: parse_count(&fields.retail_car_count_sat_sun),
            retail_revenue_mon_fri: parse_amount(&fields.retail_revenue_mon_fri),
            retail_revenue_sat_sun: parse_amount(&fields.retail_revenue_sat_sun),
            total_revenue_mon_fri: parse_amount(&fields.total_revenue_mon_fri),
            total_revenue_sat_sun: parse_amount(&fields.total_revenue_sat_sun),
            staff_hours_mon_fri: parse_amount(&fields.staff_hours_mon_fri),
            staff_hours_sat_sun: parse_amount(&fields.staff_hours_sat_sun),
            total_club_plans_sold: parse_count(&fields.total_club_plans_sold),
            total_club_plan_members: parse_count(&fields.total_club_plan_members),
        }
    }

    /// The parsed counter as a spreadsheet number.
    pub fn value(&self, field: InputField) -> f64 {
        match field {
            InputField::CarCountMonFri => self.car_count_mon_fri as f64,
            InputField::CarCountSatSun => self.car_count_sat_sun as f64,
            InputField::RetailCarCountMonFri => self.retail_car_count_mon_fri as f64,
            InputField::RetailCarCountSatSun => self.retail_car_count_sat_sun as f64,
            InputField::RetailRevenueMonFri => self.retail_revenue_mon_fri,
            InputField::RetailRevenueSatSun => self.retail_revenue_sat_sun,
            InputField::TotalRevenueMonFri => self.total_revenue_mon_fri,
            InputField::TotalRevenueSatSun => self.total_revenue_sat_sun,
            InputField::StaffHoursMonFri => self.staff_hours_mon_fri,
            InputField::StaffHoursSatSun => self.staff_hours_sat_sun,
            InputField::TotalClubPlansSold => self.total_club_plans_sold as f64,
            InputField::TotalClubPlanMembers => self.total_club_plan_members as f64,
        }
    }
}

/// Rounded quotient, or 0 when the denominator is 0.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        round2(numerator / denominator)
    }
}

/// Derive the weekly ratios from raw counter text. Never fails.
pub fn calculate(fields: &ReportFields) -> DerivedMetrics {
    calculate_parsed(&ParsedInputs::from_fields(fields))
}

pub fn calculate_parsed(p: &ParsedInputs) -> DerivedMetrics {
    // Counts saturate rather than overflow on absurd input.
    let total_cars = p.car_count_mon_fri.saturating_add(p.car_count_sat_sun);
    let total_revenue = p.total_revenue_mon_fri + p.total_revenue_sat_sun;
    let total_retail_cars = p
        .retail_car_count_mon_fri
        .saturating_add(p.retail_car_count_sat_sun);
    let total_retail_revenue = p.retail_revenue_mon_fri + p.retail_revenue_sat_sun;
    let total_staff_hours = p.staff_hours_mon_fri + p.staff_hours_sat_sun;

    // Member visits are everything that was not a retail visit.
    let avg_member_visit = if total_cars != 0 && total_cars != total_retail_cars {
        ratio(
            total_revenue - total_retail_revenue,
            total_cars.saturating_sub(total_retail_cars) as f64,
        )
    } else {
        0.0
    };

    DerivedMetrics {
        total_cars,
        total_revenue,
        avg_retail_visit: ratio(total_retail_revenue, total_retail_cars as f64),
        avg_member_visit,
        cars_per_labor_hour_mon_fri: ratio(p.car_count_mon_fri as f64, p.staff_hours_mon_fri),
        cars_per_labor_hour_sat_sun: ratio(p.car_count_sat_sun as f64, p.staff_hours_sat_sun),
        total_cars_per_man_hour: ratio(total_cars as f64, total_staff_hours),
        conversion_rate: ratio(p.total_club_plans_sold as f64, total_retail_cars as f64),
    }
}

/// Derived rows for an in-progress submission, formatted for display.
pub fn preview_rows(fields: &ReportFields) -> Vec<MetricPreviewRow> {
    let derived = calculate(fields);
    Metric::ALL
        .into_iter()
        .filter_map(|metric| {
            let value = derived.get(metric)?;
            let value = match metric {
                Metric::TotalCars => format_int(derived.total_cars),
                _ => format_number(value, 2),
            };
            Some(MetricPreviewRow {
                metric: metric.label().to_string(),
                value,
            })
        })
        .collect()
}
