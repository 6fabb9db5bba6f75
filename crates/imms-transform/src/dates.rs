//! Date parsing and localized display.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use imms_model::Language;

/// Date-only layouts accepted for dates of birth, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
    "%Y%m%d",
];

/// Date-time layouts; only the date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

const FRENCH_MONTHS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Parse a date of birth in any supported layout.
///
/// Returns `None` for blank or unrecognized input.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse a vaccination-history date such as `Jan 1, 2020`.
pub fn parse_history_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%b %d, %Y").ok()
}

/// Localized display form: `Mar 09, 2015` or `9 mars 2015`.
pub fn format_display_date(date: NaiveDate, language: Language) -> String {
    match language {
        Language::English => date.format("%b %d, %Y").to_string(),
        Language::French => format!(
            "{} {} {}",
            date.day(),
            FRENCH_MONTHS[date.month0() as usize],
            date.year()
        ),
    }
}

/// Whole years between `birth` and `on`, adjusted for whether the birthday
/// has passed.
pub fn age_on(birth: NaiveDate, on: NaiveDate) -> i32 {
    let mut age = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}
