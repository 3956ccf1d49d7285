//! Calendar-date normalization.
//!
//! Report cells arrive as native spreadsheet dates, free text, or raw
//! serial numbers. Everything normalizes to `YYYY-MM-DD`; anything that
//! cannot be read as a date becomes `None`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

/// Output format for every normalized date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest serial a spreadsheet can represent (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

/// Smallest serial accepted from text (1927-05-18). Below it a number in
/// text is far more likely a year or a count than a date.
const MIN_TEXT_SERIAL: f64 = 10_000.0;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    // Two-digit years first: `%Y` would accept "24" as year 24.
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Converts a spreadsheet serial (days since 1899-12-30) to a date.
///
/// The fractional part is a time of day and is dropped.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Parses free text that may hold a date, a datetime or a serial number.
///
/// Numeric text counts as a serial only from [`MIN_TEXT_SERIAL`] up, so
/// "2024" is not a date. Native numeric cells go through
/// [`serial_to_date`] directly.
pub fn parse_text_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if is_blank_marker(text) {
        return None;
    }

    if let Ok(serial) = text.parse::<f64>() {
        if serial < MIN_TEXT_SERIAL {
            return None;
        }
        return serial_to_date(serial);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Normalizes text to `YYYY-MM-DD`, or `None` when it is not a date.
pub fn normalize_text(text: &str) -> Option<String> {
    parse_text_date(text).map(format_date)
}

/// Normalizes an optional stored value.
pub fn normalize_opt(value: Option<&str>) -> Option<String> {
    value.and_then(normalize_text)
}

/// Text the report tools write for "no value".
pub fn is_blank_marker(text: &str) -> bool {
    text.is_empty()
        || text.eq_ignore_ascii_case("nan")
        || text.eq_ignore_ascii_case("nat")
        || text.eq_ignore_ascii_case("none")
        || text == crate::NOT_AVAILABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_to_date() {
        assert_eq!(
            serial_to_date(45306.0),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            serial_to_date(45306.75),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(serial_to_date(0.0), None);
        assert_eq!(serial_to_date(-3.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
        assert_eq!(serial_to_date(9_999_999.0), None);
    }

    #[test]
    fn test_equivalent_representations_normalize_equally() {
        let expected = Some("2024-01-15".to_string());
        assert_eq!(normalize_text("45306"), expected);
        assert_eq!(normalize_text("45306.0"), expected);
        assert_eq!(normalize_text("2024-01-15"), expected);
        assert_eq!(normalize_text("15/01/2024"), expected);
        assert_eq!(normalize_text("15-Jan-2024"), expected);
        assert_eq!(normalize_text("15-Jan-24"), expected);
        assert_eq!(normalize_text("2024-01-15 00:00:00"), expected);
        assert_eq!(normalize_text("2024-01-15T08:30:00"), expected);
        assert_eq!(normalize_text(" 2024/01/15 "), expected);
        assert_eq!(normalize_text("Jan 15, 2024"), expected);
    }

    #[test]
    fn test_numeric_text_outside_serial_range() {
        assert_eq!(normalize_text("2024"), None);
        assert_eq!(normalize_text("12"), None);
        assert_eq!(normalize_text("9999.5"), None);
        assert_eq!(normalize_text("10000"), Some("1927-05-18".to_string()));
        // Numeric cells are not subject to the text range.
        assert_eq!(serial_to_date(2024.0), NaiveDate::from_ymd_opt(1905, 7, 16));
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(normalize_text(""), None);
        assert_eq!(normalize_text("nan"), None);
        assert_eq!(normalize_text("NaT"), None);
        assert_eq!(normalize_text("N/A"), None);
        assert_eq!(normalize_text("TBA"), None);
        assert_eq!(normalize_text("31/02/2024"), None);
    }

    #[test]
    fn test_normalize_opt() {
        assert_eq!(normalize_opt(None), None);
        assert_eq!(
            normalize_opt(Some("2023-12-01")),
            Some("2023-12-01".to_string())
        );
    }
}
