use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// A site from the external location catalog. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub state: String,
}

/// The twelve counters a location submits each week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    CarCountMonFri,
    CarCountSatSun,
    RetailCarCountMonFri,
    RetailCarCountSatSun,
    RetailRevenueMonFri,
    RetailRevenueSatSun,
    TotalRevenueMonFri,
    TotalRevenueSatSun,
    StaffHoursMonFri,
    StaffHoursSatSun,
    TotalClubPlansSold,
    TotalClubPlanMembers,
}

impl InputField {
    pub const ALL: [InputField; 12] = [
        InputField::CarCountMonFri,
        InputField::CarCountSatSun,
        InputField::RetailCarCountMonFri,
        InputField::RetailCarCountSatSun,
        InputField::RetailRevenueMonFri,
        InputField::RetailRevenueSatSun,
        InputField::TotalRevenueMonFri,
        InputField::TotalRevenueSatSun,
        InputField::StaffHoursMonFri,
        InputField::StaffHoursSatSun,
        InputField::TotalClubPlansSold,
        InputField::TotalClubPlanMembers,
    ];

    /// The spreadsheet row that echoes this counter.
    pub fn metric(self) -> Metric {
        match self {
            InputField::CarCountMonFri => Metric::CarCountMonFri,
            InputField::CarCountSatSun => Metric::CarCountSatSun,
            InputField::RetailCarCountMonFri => Metric::RetailCarCountMonFri,
            InputField::RetailCarCountSatSun => Metric::RetailCarCountSatSun,
            InputField::RetailRevenueMonFri => Metric::RetailRevenueMonFri,
            InputField::RetailRevenueSatSun => Metric::RetailRevenueSatSun,
            InputField::TotalRevenueMonFri => Metric::TotalRevenueMonFri,
            InputField::TotalRevenueSatSun => Metric::TotalRevenueSatSun,
            InputField::StaffHoursMonFri => Metric::StaffHoursMonFri,
            InputField::StaffHoursSatSun => Metric::StaffHoursSatSun,
            InputField::TotalClubPlansSold => Metric::TotalClubPlansSold,
            InputField::TotalClubPlanMembers => Metric::TotalClubPlanMembers,
        }
    }
}

/// Raw counter text exactly as entered. Empty means "not filled in".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFields {
    pub car_count_mon_fri: String,
    pub car_count_sat_sun: String,
    pub retail_car_count_mon_fri: String,
    pub retail_car_count_sat_sun: String,
    pub retail_revenue_mon_fri: String,
    pub retail_revenue_sat_sun: String,
    pub total_revenue_mon_fri: String,
    pub total_revenue_sat_sun: String,
    pub staff_hours_mon_fri: String,
    pub staff_hours_sat_sun: String,
    pub total_club_plans_sold: String,
    pub total_club_plan_members: String,
}

impl ReportFields {
    pub fn value(&self, field: InputField) -> &str {
        match field {
            InputField::CarCountMonFri => &self.car_count_mon_fri,
            InputField::CarCountSatSun => &self.car_count_sat_sun,
            InputField::RetailCarCountMonFri => &self.retail_car_count_mon_fri,
            InputField::RetailCarCountSatSun => &self.retail_car_count_sat_sun,
            InputField::RetailRevenueMonFri => &self.retail_revenue_mon_fri,
            InputField::RetailRevenueSatSun => &self.retail_revenue_sat_sun,
            InputField::TotalRevenueMonFri => &self.total_revenue_mon_fri,
            InputField::TotalRevenueSatSun => &self.total_revenue_sat_sun,
            InputField::StaffHoursMonFri => &self.staff_hours_mon_fri,
            InputField::StaffHoursSatSun => &self.staff_hours_sat_sun,
            InputField::TotalClubPlansSold => &self.total_club_plans_sold,
            InputField::TotalClubPlanMembers => &self.total_club_plan_members,
        }
    }

    pub fn set(&mut self, field: InputField, value: impl Into<String>) {
        let slot = match field {
            InputField::CarCountMonFri => &mut self.car_count_mon_fri,
            InputField::CarCountSatSun => &mut self.car_count_sat_sun,
            InputField::RetailCarCountMonFri => &mut self.retail_car_count_mon_fri,
            InputField::RetailCarCountSatSun => &mut self.retail_car_count_sat_sun,
            InputField::RetailRevenueMonFri => &mut self.retail_revenue_mon_fri,
            InputField::RetailRevenueSatSun => &mut self.retail_revenue_sat_sun,
            InputField::TotalRevenueMonFri => &mut self.total_revenue_mon_fri,
            InputField::TotalRevenueSatSun => &mut self.total_revenue_sat_sun,
            InputField::StaffHoursMonFri => &mut self.staff_hours_mon_fri,
            InputField::StaffHoursSatSun => &mut self.staff_hours_sat_sun,
            InputField::TotalClubPlansSold => &mut self.total_club_plans_sold,
            InputField::TotalClubPlanMembers => &mut self.total_club_plan_members,
        };
        *slot = value.into();
    }

    /// Builder-style setter, handy when assembling fixtures.
    pub fn with(mut self, field: InputField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }
}

/// One location's submission for one Mon–Sun week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyReport {
    pub location_id: i64,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub fields: ReportFields,
}

/// Ratios and sums computed from a single [`WeeklyReport`]. Never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub total_cars: i64,
    pub total_revenue: f64,
    pub avg_retail_visit: f64,
    pub avg_member_visit: f64,
    pub cars_per_labor_hour_mon_fri: f64,
    pub cars_per_labor_hour_sat_sun: f64,
    pub total_cars_per_man_hour: f64,
    pub conversion_rate: f64,
}

impl DerivedMetrics {
    /// Value for a derived row, or `None` when the row echoes a raw counter.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        let v = match metric {
            Metric::TotalCars => self.total_cars as f64,
            Metric::TotalRevenue => self.total_revenue,
            Metric::AvgRetailVisit => self.avg_retail_visit,
            Metric::AvgMemberVisit => self.avg_member_visit,
            Metric::CarsPerLaborHourMonFri => self.cars_per_labor_hour_mon_fri,
            Metric::CarsPerLaborHourSatSun => self.cars_per_labor_hour_sat_sun,
            Metric::TotalCarsPerManHour => self.total_cars_per_man_hour,
            Metric::ConversionRate => self.conversion_rate,
            _ => return None,
        };
        Some(v)
    }
}

/// Rows of a weekly sheet, declared in template order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    CarCountMonFri,
    CarCountSatSun,
    RetailCarCountMonFri,
    RetailCarCountSatSun,
    TotalCars,
    RetailRevenueMonFri,
    RetailRevenueSatSun,
    TotalRevenueMonFri,
    TotalRevenueSatSun,
    TotalRevenue,
    AvgRetailVisit,
    AvgMemberVisit,
    StaffHoursMonFri,
    StaffHoursSatSun,
    CarsPerLaborHourMonFri,
    CarsPerLaborHourSatSun,
    TotalCarsPerManHour,
    TotalClubPlansSold,
    ConversionRate,
    TotalClubPlanMembers,
}

impl Metric {
    pub const COUNT: usize = 20;

    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::CarCountMonFri,
        Metric::CarCountSatSun,
        Metric::RetailCarCountMonFri,
        Metric::RetailCarCountSatSun,
        Metric::TotalCars,
        Metric::RetailRevenueMonFri,
        Metric::RetailRevenueSatSun,
        Metric::TotalRevenueMonFri,
        Metric::TotalRevenueSatSun,
        Metric::TotalRevenue,
        Metric::AvgRetailVisit,
        Metric::AvgMemberVisit,
        Metric::StaffHoursMonFri,
        Metric::StaffHoursSatSun,
        Metric::CarsPerLaborHourMonFri,
        Metric::CarsPerLaborHourSatSun,
        Metric::TotalCarsPerManHour,
        Metric::TotalClubPlansSold,
        Metric::ConversionRate,
        Metric::TotalClubPlanMembers,
    ];

    /// Position in [`Metric::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::CarCountMonFri => "Car Count Mon - Fri",
            Metric::CarCountSatSun => "Car Count Sat - Sun",
            Metric::RetailCarCountMonFri => "Retail Car Count Mon - Fri",
            Metric::RetailCarCountSatSun => "Retail Car Count Sat - Sun",
            Metric::TotalCars => "Total Cars",
            Metric::RetailRevenueMonFri => "Retail Revenue Mon - Fri",
            Metric::RetailRevenueSatSun => "Retail Revenue Sat - Sun",
            Metric::TotalRevenueMonFri => "Total Revenue Mon - Fri",
            Metric::TotalRevenueSatSun => "Total Revenue Sat - Sun",
            Metric::TotalRevenue => "Total Revenue",
            Metric::AvgRetailVisit => "Avg. Retail Visit",
            Metric::AvgMemberVisit => "Avg. Member Visit",
            Metric::StaffHoursMonFri => "Staff Hours Mon - Fri",
            Metric::StaffHoursSatSun => "Staff Hours Sat - Sun",
            Metric::CarsPerLaborHourMonFri => "Cars Per Labor Hour Mon - Fri",
            Metric::CarsPerLaborHourSatSun => "Cars Per Labor Hour Sat & Sun",
            Metric::TotalCarsPerManHour => "Total Cars Per Man Hour",
            Metric::TotalClubPlansSold => "Total Club Plans Sold",
            Metric::ConversionRate => "Conversion Rate",
            Metric::TotalClubPlanMembers => "Total Club Plan Members",
        }
    }

    /// The raw counter a row echoes, if it is not a derived row.
    pub fn input(self) -> Option<InputField> {
        InputField::ALL.into_iter().find(|f| f.metric() == self)
    }
}

/// A report row as it arrives from the store, before dates and ids are checked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub week_start_date: Option<String>,
    #[serde(default)]
    pub week_end_date: Option<String>,
    #[serde(default, deserialize_with = "crate::util::lenient_text")]
    pub car_count_mon_fri: Option<String>,
    #[serde(default, deserialize_with = "crate::util::lenient_text")]
    pub car_count_sat_sun: Option<String>,
    #[serde(default, deserialize_with = "crate::util::lenient_text")]
    pub retail_car_count_mon_fri: Option<String>,
    #[serde(default, deserialize_with = "crate::util::lenient_text")]
    pub retail_car_count_sat_sun: Option<String>,
    #[serde(default, deserialize_with = "crate::util::lenient_text")]
    pub retail_revenue_mon_fri: Option<String>,
    #[serde(default, deserialize_with = "crate::util::lenient_text")]
    pub retail_revenue_sat_sun: Option<String>,
    #[serde(default, deserialize_with = "crate::util::lenient_text")]
    pub total_revenue_mon_fri: Option<String>,
    #[serde(default, deserialize_with = "crate::util::lenient_text")]
    pub total_revenue_sat_sun: Option<String>,
    #[serde(default, deserialize_with = "crate::util::lenient_text")]
    pub staff_hours_mon_fri: Option<String>,
    #[serde(default, deserialize_with = "crate::util::lenient_text")]
    pub staff_hours_sat_sun: Option<String>,
    #[serde(default, deserialize_with = "crate::util::lenient_text")]
    pub total_club_plans_sold: Option<String>,
    #[serde(default, deserialize_with = "crate::util::lenient_text")]
    pub total_club_plan_members: Option<String>,
}

impl RawReport {
    /// Counter text with missing values as empty strings.
    pub fn fields(&self) -> ReportFields {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        ReportFields {
            car_count_mon_fri: text(&self.car_count_mon_fri),
            car_count_sat_sun: text(&self.car_count_sat_sun),
            retail_car_count_mon_fri: text(&self.retail_car_count_mon_fri),
            retail_car_count_sat_sun: text(&self.retail_car_count_sat_sun),
            retail_revenue_mon_fri: text(&self.retail_revenue_mon_fri),
            retail_revenue_sat_sun: text(&self.retail_revenue_sat_sun),
            total_revenue_mon_fri: text(&self.total_revenue_mon_fri),
            total_revenue_sat_sun: text(&self.total_revenue_sat_sun),
            staff_hours_mon_fri: text(&self.staff_hours_mon_fri),
            staff_hours_sat_sun: text(&self.staff_hours_sat_sun),
            total_club_plans_sold: text(&self.total_club_plans_sold),
            total_club_plan_members: text(&self.total_club_plan_members),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MetricPreviewRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct AvailabilityRow {
    #[serde(rename = "Location")]
    #[tabled(rename = "Location")]
    pub location: String,
    #[serde(rename = "State")]
    #[tabled(rename = "State")]
    pub state: String,
    #[serde(rename = "DataAvailable")]
    #[tabled(rename = "DataAvailable")]
    pub available: bool,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct WeekSummaryRow {
    #[serde(rename = "Sheet")]
    #[tabled(rename = "Sheet")]
    pub sheet: String,
    #[serde(rename = "WeekEnding")]
    #[tabled(rename = "WeekEnding")]
    pub week_ending: NaiveDate,
    #[serde(rename = "LocationsReporting")]
    #[tabled(rename = "LocationsReporting")]
    pub locations_reporting: usize,
    #[serde(rename = "TotalCars")]
    #[tabled(rename = "TotalCars")]
    pub total_cars: String,
    #[serde(rename = "TotalRevenue")]
    #[tabled(rename = "TotalRevenue")]
    pub total_revenue: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_index_matches_declared_order() {
        for (i, m) in Metric::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }

    #[test]
    fn every_input_field_has_an_echo_row() {
        for f in InputField::ALL {
            assert_eq!(f.metric().input(), Some(f));
        }
        assert_eq!(Metric::TotalCars.input(), None);
        assert_eq!(Metric::ConversionRate.input(), None);
    }

    #[test]
    fn derived_get_covers_exactly_the_non_input_rows() {
        let d = DerivedMetrics::default();
        for m in Metric::ALL {
            assert_eq!(d.get(m).is_some(), m.input().is_none(), "{:?}", m);
        }
    }

    #[test]
    fn set_and_value_round_trip_each_field() {
        let mut fields = ReportFields::default();
        for (i, f) in InputField::ALL.iter().enumerate() {
            fields.set(*f, i.to_string());
        }
        for (i, f) in InputField::ALL.iter().enumerate() {
            assert_eq!(fields.value(*f), i.to_string());
        }
    }
}
