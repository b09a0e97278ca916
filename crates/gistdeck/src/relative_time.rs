//! "Last updated 3 days ago" style phrases.
//!
//! Months are 30 days and years 365. Timestamps in the future count as
//! "just now".

use chrono::{DateTime, Utc};

struct Elapsed {
    minutes: i64,
    hours: i64,
    days: i64,
    months: i64,
    years: i64,
}

impl Elapsed {
    fn between(then: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let minutes = (now - then).num_minutes().max(0);
        let days = minutes / (60 * 24);
        Self {
            minutes,
            hours: minutes / 60,
            days,
            months: days / 30,
            years: days / 365,
        }
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Phrase for a last-modified timestamp.
pub fn updated_phrase(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let e = Elapsed::between(updated_at, now);

    let ago = if e.minutes < 60 {
        if e.minutes <= 1 {
            "a few minutes".to_string()
        } else {
            plural(e.minutes, "minute")
        }
    } else if e.hours < 24 {
        if e.hours == 1 {
            "an hour".to_string()
        } else {
            plural(e.hours, "hour")
        }
    } else if e.days < 30 {
        if e.days == 1 {
            "a day".to_string()
        } else {
            plural(e.days, "day")
        }
    } else if e.months < 12 {
        if e.months == 1 {
            "a month".to_string()
        } else {
            plural(e.months, "month")
        }
    } else if e.years <= 1 {
        // 360 to 364 days is twelve months but zero whole years
        "a year".to_string()
    } else {
        plural(e.years, "year")
    };

    format!("Last updated {} ago", ago)
}

/// Phrase for a creation timestamp. Anything a year or older shows the
/// date instead.
pub fn created_phrase(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let e = Elapsed::between(created_at, now);

    if e.hours < 24 {
        format!("Created {} ago", plural(e.hours, "hour"))
    } else if e.days < 30 {
        format!("Created {} ago", plural(e.days, "day"))
    } else if e.months < 12 {
        format!("Created {} ago", plural(e.months, "month"))
    } else {
        format!("Created on {}", created_at.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_updated_phrases() {
        let now = now();
        let cases = [
            (Duration::seconds(30), "Last updated a few minutes ago"),
            (Duration::minutes(1), "Last updated a few minutes ago"),
            (Duration::minutes(42), "Last updated 42 minutes ago"),
            (Duration::minutes(61), "Last updated an hour ago"),
            (Duration::hours(5), "Last updated 5 hours ago"),
            (Duration::hours(30), "Last updated a day ago"),
            (Duration::days(12), "Last updated 12 days ago"),
            (Duration::days(31), "Last updated a month ago"),
            (Duration::days(200), "Last updated 6 months ago"),
            (Duration::days(362), "Last updated a year ago"),
            (Duration::days(366), "Last updated a year ago"),
            (Duration::days(365 * 3), "Last updated 3 years ago"),
        ];
        for (age, expected) in cases {
            assert_eq!(updated_phrase(now - age, now), expected, "age {age:?}");
        }
    }

    #[test]
    fn test_created_phrases() {
        let now = now();
        assert_eq!(created_phrase(now - Duration::minutes(10), now), "Created 0 hours ago");
        assert_eq!(created_phrase(now - Duration::hours(1), now), "Created 1 hour ago");
        assert_eq!(created_phrase(now - Duration::days(3), now), "Created 3 days ago");
        assert_eq!(created_phrase(now - Duration::days(45), now), "Created 1 month ago");
        assert_eq!(
            created_phrase(Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap(), now),
            "Created on 2023-02-01"
        );
    }

    #[test]
    fn test_future_timestamps_read_as_recent() {
        let now = now();
        assert_eq!(
            updated_phrase(now + Duration::hours(2), now),
            "Last updated a few minutes ago"
        );
    }
}
