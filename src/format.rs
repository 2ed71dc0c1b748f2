//! Text formatting for on-page values and the output filename.

use chrono::NaiveDate;

use crate::dataset::KvaRating;

/// Formats a number the way it is written in the data: no forced decimals.
///
/// `60.0` becomes `"60"`, `2.14` stays `"2.14"`, negative zero prints as `"0"`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    format!("{}", value)
}

/// Appends a literal unit, e.g. `with_unit(300.0, "W")` is `"300 W"`.
pub fn with_unit(value: f64, unit: &str) -> String {
    format!("{} {}", format_number(value), unit)
}

/// Table header label of a load point.
pub fn load_label(watts: f64) -> String {
    with_unit(watts, "W")
}

/// Table cell label of a runtime.
pub fn runtime_label(minutes: f64) -> String {
    with_unit(minutes, "min")
}

/// Rating label, e.g. `"2 kVA"`.
pub fn rating_label(rating: KvaRating) -> String {
    format!("{} kVA", rating.key())
}

/// Long-form date printed on the report, e.g. `"March 15, 2024"`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Name of the exported file:
/// `<prefix>_<key>kVA_Runtime_Chart_<YYYY-MM-DD>.pdf`.
pub fn report_filename(prefix: &str, rating: KvaRating, date: NaiveDate) -> String {
    format!(
        "{}_{}kVA_Runtime_Chart_{}.pdf",
        prefix,
        rating.key(),
        date.format("%Y-%m-%d")
    )
}
