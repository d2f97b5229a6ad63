//! iCalendar property value parsing (RFC 5545 §3.3).
//!
//! Date-times are read as naive local values: `TZID` parameters and the UTC
//! `Z` suffix are not applied.

use chrono::{Duration, NaiveDate, NaiveDateTime};

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Parses a `DATE` or `DATE-TIME` value. Dates become midnight.
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    let value = value.strip_suffix('Z').unwrap_or(value);
    if value.contains('T') {
        NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).ok()
    } else {
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }
}

/// Parses a `DATE` or `DATE-TIME` value, keeping only the date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_date_time(value).map(|dt| dt.date())
}

/// Parses a comma-separated list of dates (as used by `EXDATE`).
///
/// Returns `None` if any element is malformed.
pub fn parse_date_list(value: &str) -> Option<Vec<NaiveDate>> {
    value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(parse_date)
        .collect()
}

/// Parses a `DURATION` value such as `PT1H30M`, `P1D` or `-P2W`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (negative, rest) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };
    let rest = rest.strip_prefix('P')?;

    let mut total = Duration::zero();
    let mut in_time = false;
    let mut digits = String::new();
    let mut seen_component = false;

    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            'T' if !in_time && digits.is_empty() => in_time = true,
            designator => {
                let n: i64 = digits.parse().ok()?;
                digits.clear();
                let part = match (in_time, designator) {
                    (false, 'W') => Duration::try_weeks(n)?,
                    (false, 'D') => Duration::try_days(n)?,
                    (true, 'H') => Duration::try_hours(n)?,
                    (true, 'M') => Duration::try_minutes(n)?,
                    (true, 'S') => Duration::try_seconds(n)?,
                    _ => return None,
                };
                total = total.checked_add(&part)?;
                seen_component = true;
            }
        }
    }

    if !digits.is_empty() || !seen_component {
        return None;
    }
    Some(if negative { -total } else { total })
}

/// Undoes RFC 5545 TEXT escaping (`\,` `\;` `\\` `\n`).
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_local_utc_and_date_values() {
        let local = parse_date_time("20240401T090000").unwrap();
        assert_eq!(local, date(2024, 4, 1).and_hms_opt(9, 0, 0).unwrap());

        let utc = parse_date_time("20240401T090000Z").unwrap();
        assert_eq!(utc, local);

        let all_day = parse_date_time("20240401").unwrap();
        assert_eq!(all_day, date(2024, 4, 1).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date_time("2024-04-01").is_none());
        assert!(parse_date_time("20241301").is_none());
        assert!(parse_date_time("").is_none());
    }

    #[test]
    fn parses_exdate_lists() {
        assert_eq!(
            parse_date_list("20240415T090000,20240422T090000").unwrap(),
            vec![date(2024, 4, 15), date(2024, 4, 22)]
        );
        assert!(parse_date_list("20240415T090000,nope").is_none());
    }

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("PT1H30M"), Some(Duration::minutes(90)));
        assert_eq!(parse_duration("P1D"), Some(Duration::days(1)));
        assert_eq!(parse_duration("P1DT2H"), Some(Duration::hours(26)));
        assert_eq!(parse_duration("P2W"), Some(Duration::weeks(2)));
        assert_eq!(parse_duration("PT45S"), Some(Duration::seconds(45)));
        assert_eq!(parse_duration("-PT15M"), Some(Duration::minutes(-15)));
    }

    #[test]
    fn rejects_malformed_durations() {
        assert_eq!(parse_duration("1H"), None);
        assert_eq!(parse_duration("P"), None);
        assert_eq!(parse_duration("PT"), None);
        assert_eq!(parse_duration("PT1H30"), None);
        assert_eq!(parse_duration("P1H"), None);
    }

    #[test]
    fn unescapes_text() {
        assert_eq!(unescape_text(r"AA session\, parking"), "AA session, parking");
        assert_eq!(unescape_text(r"a\;b\\c\nd"), "a;b\\c\nd");
    }
}
