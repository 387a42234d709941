//! Lenient login timestamp parsing into calendar fields.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Calendar breakdown of a login time. Weekday is 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginTime {
    pub hour: u32,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

impl From<NaiveDateTime> for LoginTime {
    fn from(dt: NaiveDateTime) -> Self {
        Self {
            hour: dt.hour(),
            day: dt.day(),
            month: dt.month(),
            year: dt.year(),
            weekday: dt.weekday().num_days_from_monday(),
        }
    }
}

/// Parse an ISO-ish datetime. Offsets are honoured by keeping the wall-clock time
/// in the stated offset; a bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }
    let naive = s.strip_suffix('Z').unwrap_or(s);
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(naive, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn login_time(raw: &str) -> Option<LoginTime> {
    parse_timestamp(raw).map(LoginTime::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_with_t_separator_or_minutes_only() {
        let t = login_time("2025-06-15T14:30:00+0000").unwrap();
        assert_eq!((t.hour, t.day), (14, 15));
        let t = login_time("2025-06-15T14:30+02:00").unwrap();
        assert_eq!((t.hour, t.day), (14, 15));
        let t = login_time("2025-06-15 09:05-0500").unwrap();
        assert_eq!(t.hour, 9);
    }

    #[test]
    fn slash_bare_date_is_midnight() {
        let t = login_time("2025/06/15").unwrap();
        assert_eq!((t.hour, t.day, t.month, t.year, t.weekday), (0, 15, 6, 2025, 6));
        assert_eq!(login_time("2025-06-15").unwrap().hour, 0);
    }

    #[test]
    fn space_separated() {
        let t = login_time("2025-06-15 14:30:00").unwrap();
        assert_eq!((t.hour, t.day, t.month, t.year), (14, 15, 6, 2025));
        // 2025-06-15 is a Sunday
        assert_eq!(t.weekday, 6);
    }

    #[test]
    fn iso_with_fraction_and_offset() {
        let t = login_time("2025-06-16T23:05:10.123456+02:00").unwrap();
        assert_eq!(t.hour, 23);
        assert_eq!(t.weekday, 0);
    }

    #[test]
    fn zulu_and_minutes_only() {
        assert_eq!(login_time("2025-01-01T08:00:00Z").unwrap().hour, 8);
        assert_eq!(login_time("2025-01-01 07:45").unwrap().hour, 7);
    }

    #[test]
    fn bare_date_is_midnight() {
        let t = login_time("2024-02-29").unwrap();
        assert_eq!((t.hour, t.day, t.month), (0, 29, 2));
    }

    #[test]
    fn garbage_rejected() {
        assert!(login_time("yesterday at noon").is_none());
        assert!(login_time("").is_none());
        assert!(login_time("2025-13-40 10:00:00").is_none());
    }
}
