//! Date and date-time parsing for source values.
//!
//! Sources carry ISO 8601 (`2023-03-12`, `2023-03-10T15:30:47.000Z`) and a
//! couple of day-first local forms (`12.03.2023`, `12/03/2023`). Everything
//! is normalized to the ISO extended format the schemas expect.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y"];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a calendar date. A full date-time is accepted and truncated to
/// its date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .map(|parsed| parsed.date_naive())
                .ok()
        })
        .or_else(|| parse_naive_date_time(value).map(|parsed| parsed.date()))
}

/// Normalizes a date-time to ISO 8601 extended form.
///
/// Offsets are preserved (`Z` for UTC), zero fractional seconds are
/// dropped, and a bare date becomes midnight local time.
pub fn normalize_date_time(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.to_rfc3339_opts(SecondsFormat::AutoSi, true));
    }
    if let Some(parsed) = parse_naive_date_time(value) {
        return Some(parsed.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(|date| format!("{}T00:00:00", date.format("%Y-%m-%d")))
}

/// Formats a caller-supplied generation timestamp for `CreDtTm`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_naive_date_time(value: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_iso_and_day_first_dates() {
        let expected = NaiveDate::from_ymd_opt(2023, 3, 12);
        assert_eq!(parse_date("2023-03-12"), expected);
        assert_eq!(parse_date("12.03.2023"), expected);
        assert_eq!(parse_date(" 12/03/2023 "), expected);
        assert_eq!(parse_date("2023-03-12T08:00:00Z"), expected);
    }

    #[test]
    fn rejects_impossible_and_free_text_dates() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date("2023-02-30"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn normalizes_date_times() {
        assert_eq!(
            normalize_date_time("2023-03-10T15:30:47.000Z").as_deref(),
            Some("2023-03-10T15:30:47Z")
        );
        assert_eq!(
            normalize_date_time("2023-03-10T15:30:47+02:00").as_deref(),
            Some("2023-03-10T15:30:47+02:00")
        );
        assert_eq!(
            normalize_date_time("2023-03-10 15:30:47").as_deref(),
            Some("2023-03-10T15:30:47")
        );
        assert_eq!(
            normalize_date_time("2023-03-10").as_deref(),
            Some("2023-03-10T00:00:00")
        );
        assert_eq!(normalize_date_time("yesterday"), None);
    }

    #[test]
    fn timestamp_uses_whole_seconds() {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(timestamp), "2024-01-02T03:04:05Z");
    }
}
