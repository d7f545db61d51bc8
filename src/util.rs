// Utility helpers for parsing and formatting.
//
// Counter text from the submission form is forgiving: anything that is not a
// number becomes zero here so the calculator never has to deal with errors.
use chrono::{Datelike, Duration, NaiveDate};
use num_format::{Locale, ToFormattedString};
use serde::{de::IgnoredAny, Deserialize, Deserializer};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in hand-entered data.
///
/// - Trims whitespace.
/// - Strips thousands separators like `","` before parsing.
/// - Accepts exponent notation (`1.5e3`).
/// - Returns `None` for anything that cannot be parsed or is not finite
///   (`NaN`, `inf`).
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whole-number counter. Fractional text is truncated toward zero; anything
/// unparseable is 0.
pub fn parse_count(s: &str) -> i64 {
    let cleaned = s.trim().replace(',', "");
    if let Ok(n) = cleaned.parse::<i64>() {
        return n;
    }
    parse_f64_safe(Some(s)).map(|v| v.trunc() as i64).unwrap_or(0)
}

/// Money or hours counter; unparseable is 0.
pub fn parse_amount(s: &str) -> f64 {
    parse_f64_safe(Some(s)).unwrap_or(0.0)
}

/// Round to two decimals, half-up.
pub fn round2(v: f64) -> f64 {
    (v * 100.0 + 0.5).floor() / 100.0
}

/// Accepts `YYYY-MM-DD`, or a timestamp that starts with one
/// (`2024-03-10T00:00:00.000Z`).
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Weeks run Monday to Sunday.
pub fn week_end_for(start: NaiveDate) -> NaiveDate {
    start + Duration::days(6)
}

/// The four complete weeks before the week containing `today`, newest first.
pub fn last_four_weeks(today: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let this_monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    (1..=4)
        .map(|i| {
            let start = this_monday - Duration::weeks(i);
            (start, week_end_for(start))
        })
        .collect()
}

/// `Mar 4, 2024 - Mar 10, 2024`
pub fn week_label(start: NaiveDate) -> String {
    format!(
        "{} - {}",
        start.format("%b %-d, %Y"),
        week_end_for(start).format("%b %-d, %Y")
    )
}

/// Short date used for sheet names: `3-10-24`.
pub fn sheet_name(date: NaiveDate) -> String {
    date.format("%-m-%d-%y").to_string()
}

/// `March 10, 2024`
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn download_file_name(today: NaiveDate) -> String {
    format!("Reports_{}.xlsx", today.format("%Y-%m-%d"))
}

/// Serde helper for counters that may arrive as JSON numbers, strings, or
/// nothing at all. Values of any other shape read as empty text.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Int(i64),
        Float(f64),
        Other(IgnoredAny),
    }

    let value = Option::<TextOrNumber>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Int(n) => n.to_string(),
        TextOrNumber::Float(f) => f.to_string(),
        TextOrNumber::Other(_) => String::new(),
    }))
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let neg = n.is_sign_negative() && s.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_count_is_lenient() {
        assert_eq!(parse_count("120"), 120);
        assert_eq!(parse_count(" 1,200 "), 1200);
        assert_eq!(parse_count("12.9"), 12);
        assert_eq!(parse_count("-3"), -3);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("twelve"), 0);
        assert_eq!(parse_count("NaN"), 0);
        assert_eq!(parse_count("2E2"), 200);
        assert_eq!(parse_count("1.5e3"), 1500);
    }

    #[test]
    fn parse_amount_is_lenient() {
        assert_eq!(parse_amount("1,500.25"), 1500.25);
        assert_eq!(parse_amount("  40.5"), 40.5);
        assert_eq!(parse_amount("$"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
        assert_eq!(parse_amount("-infinity"), 0.0);
        assert_eq!(parse_amount("1.5e3"), 1500.0);
        assert_eq!(parse_amount("2E2"), 200.0);
        assert_eq!(parse_amount("12abc"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
    }

    #[test]
    fn round2_rounds_half_up() {
        assert_eq!(round2(20.0), 20.0);
        assert_eq!(round2(1.0 / 3.0), 0.33);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(0.125), 0.13);
    }

    #[test]
    fn parse_date_accepts_timestamps() {
        assert_eq!(parse_date_safe(Some("2024-03-10")), Some(d(2024, 3, 10)));
        assert_eq!(
            parse_date_safe(Some("2024-03-10T00:00:00.000Z")),
            Some(d(2024, 3, 10))
        );
        assert_eq!(parse_date_safe(Some("03/10/2024")), None);
        assert_eq!(parse_date_safe(Some("")), None);
        assert_eq!(parse_date_safe(None), None);
    }

    #[test]
    fn sheet_and_title_dates() {
        assert_eq!(sheet_name(d(2024, 3, 10)), "3-10-24");
        assert_eq!(sheet_name(d(2024, 11, 3)), "11-03-24");
        assert_eq!(long_date(d(2024, 3, 10)), "March 10, 2024");
        assert_eq!(download_file_name(d(2026, 10, 19)), "Reports_2026-10-19.xlsx");
    }

    #[test]
    fn last_four_weeks_skips_the_current_week() {
        // Wednesday
        let weeks = last_four_weeks(d(2024, 10, 16));
        assert_eq!(weeks.len(), 4);
        assert_eq!(weeks[0], (d(2024, 10, 7), d(2024, 10, 13)));
        assert_eq!(weeks[3], (d(2024, 9, 16), d(2024, 9, 22)));

        // A Sunday still belongs to the week that began the Monday before.
        let weeks = last_four_weeks(d(2024, 10, 20));
        assert_eq!(weeks[0].0, d(2024, 10, 7));
    }

    #[test]
    fn week_label_spans_monday_to_sunday() {
        assert_eq!(week_label(d(2024, 3, 4)), "Mar 4, 2024 - Mar 10, 2024");
    }

    #[test]
    fn lenient_text_accepts_numbers_and_strings() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "lenient_text")]
            v: Option<String>,
        }
        let parse = |json: &str| serde_json::from_str::<Row>(json).unwrap().v;
        assert_eq!(parse(r#"{"v": 100}"#), Some("100".to_string()));
        assert_eq!(parse(r#"{"v": 12.5}"#), Some("12.5".to_string()));
        assert_eq!(parse(r#"{"v": "7"}"#), Some("7".to_string()));
        assert_eq!(parse(r#"{"v": null}"#), None);
        assert_eq!(parse(r#"{}"#), None);
        assert_eq!(parse(r#"{"v": true}"#), Some(String::new()));
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 2), "-1,500.00");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(5.0, 0), "5");
        assert_eq!(format_int(9855), "9,855");
    }
}
