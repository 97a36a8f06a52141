use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Weekday};

/// Count Monday-Friday days in the half-open range `[start, end)`.
///
/// No holiday calendar is applied. When `end` precedes `start` the count of
/// `[end, start)` is returned negated, so `f(a, b) == -f(b, a)`.
pub fn business_days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return -business_days_between(end, start);
    }

    let days = (end - start).num_days();
    let full_weeks = days / 7;
    let mut count = full_weeks * 5;

    let mut day = start + Duration::days(full_weeks * 7);
    while day < end {
        if is_business_day(day) {
            count += 1;
        }
        day += Duration::days(1);
    }

    count
}

/// [`business_days_between`] on timestamps, truncated to their calendar dates.
pub fn business_days_between_timestamps(
    start: &DateTime<FixedOffset>,
    end: &DateTime<FixedOffset>,
) -> i64 {
    business_days_between(start.date_naive(), end.date_naive())
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Parse a ticket timestamp.
///
/// Accepts RFC 3339 and the tracker's REST form, whose offset has no colon
/// (`2024-01-01T09:30:00.000+0000`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}
