use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Current timestamp in UTC.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Today's date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a timestamp as ISO 8601 for SQLite.
pub fn to_sqlite(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Parse an ISO 8601 timestamp coming back from SQLite.
pub fn from_sqlite(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    s.parse::<DateTime<Utc>>()
}

/// `dd.mm.yyyy`, as shown in digest headers.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

pub fn parse_day(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
}

pub fn parse_clock(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s, "%H:%M")
}

/// First moment at or after `now` whose wall-clock time is `at`.
/// Exactly `at` counts as already passed, so a run never repeats.
pub fn next_occurrence(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        return today;
    }
    now.date()
        .checked_add_days(Days::new(1))
        .map(|d| d.and_time(at))
        .unwrap_or(today)
}

/// Estimated time spent typing `char_count` characters, in seconds.
///
/// Linear 0.3 s/char with a 2 s base up to 100 chars, 0.45 s/char beyond.
/// The message count does not enter the formula.
pub fn estimate_seconds(_msg_count: u64, char_count: u64) -> u64 {
    let l = char_count as f64;
    let t = if l <= 100.0 {
        0.3 * l + 2.0
    } else {
        0.3 * 100.0 + 2.0 + 0.45 * (l - 100.0)
    };
    t as u64
}

/// `1h 5m`, `3m 20s`, `45s`.
pub fn fmt_duration(sec: u64) -> String {
    let h = sec / 3600;
    let m = (sec % 3600) / 60;
    let s = sec % 60;
    if h > 0 {
        format!("{}h {}m", h, m)
    } else if m > 0 {
        format!("{}m {}s", m, s)
    } else {
        format!("{}s", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let dt = now();
        let s = to_sqlite(&dt);
        let parsed = from_sqlite(&s).unwrap();
        assert_eq!(dt.timestamp(), parsed.timestamp());
    }

    #[test]
    fn test_estimate_seconds_piecewise() {
        assert_eq!(estimate_seconds(1, 0), 2);
        assert_eq!(estimate_seconds(1, 100), 32);
        // 32 + 0.45 * 100
        assert_eq!(estimate_seconds(3, 200), 77);
    }

    #[test]
    fn test_fmt_duration() {
        assert_eq!(fmt_duration(45), "45s");
        assert_eq!(fmt_duration(200), "3m 20s");
        assert_eq!(fmt_duration(3900), "1h 5m");
    }

    #[test]
    fn test_next_occurrence() {
        let at = parse_clock("23:00").unwrap();
        let day = parse_day("2025-03-01").unwrap();
        let morning = day.and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(next_occurrence(morning, at), day.and_time(at));

        let exactly = day.and_time(at);
        let next_day = parse_day("2025-03-02").unwrap();
        assert_eq!(next_occurrence(exactly, at), next_day.and_time(at));
        let late = day.and_hms_opt(23, 30, 0).unwrap();
        assert_eq!(next_occurrence(late, at), next_day.and_time(at));
    }

    #[test]
    fn test_format_and_parse_day() {
        let d = parse_day("2026-10-16").unwrap();
        assert_eq!(format_day(d), "16.10.2026");
        assert!(parse_day("16.10.2026").is_err());
        assert_eq!(parse_clock("23:00").unwrap(), NaiveTime::from_hms_opt(23, 0, 0).unwrap());
    }
}
