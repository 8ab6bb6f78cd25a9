use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

/// Hours elapsed between `create_time` and `now`, rounded to one decimal.
/// Missing or future timestamps collapse to `0.0`, which downstream scoring
/// treats the same as brand-new content.
pub fn age_hours(create_time: Option<i64>, now: i64) -> f64 {
    let Some(created) = create_time else {
        return 0.0;
    };
    if created <= 0 || created > now {
        debug!(created, now, "timestamp out of range, treating age as zero");
        return 0.0;
    }
    round1((now - created) as f64 / 3600.0)
}

pub fn views_per_hour(views: u64, age_hours: f64) -> u64 {
    if age_hours > 0.0 {
        (views as f64 / age_hours) as u64
    } else {
        0
    }
}

/// Views per day with a floor on the age so sub-half-day items do not blow
/// up the average.
pub fn views_per_day(views: u64, age_hours: f64, min_age_days: f64) -> f64 {
    let age_days = (age_hours / 24.0).max(min_age_days);
    views as f64 / age_days
}

/// Engagement rate as a percentage of views, rounded to two decimals.
pub fn engagement_rate(likes: u64, shares: u64, comments: u64, views: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    // Counters come straight from upstream JSON; sum in f64 so three large
    // values cannot overflow.
    let interactions = likes as f64 + shares as f64 + comments as f64;
    round2(interactions / views as f64 * 100.0)
}

/// Parses a creation timestamp out of a JSON field. Upstream APIs send
/// either epoch seconds (number or numeric string) or an ISO-8601 string.
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|v| v as i64)),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            if let Ok(epoch) = trimmed.parse::<i64>() {
                return Some(epoch);
            }
            if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
                return Some(parsed.timestamp());
            }
            if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
                return Some(parsed.and_utc().timestamp());
            }
            if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                return Some(parsed.and_hms_opt(0, 0, 0)?.and_utc().timestamp());
            }
            debug!(raw = trimmed, "unparseable timestamp");
            None
        }
        _ => None,
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
