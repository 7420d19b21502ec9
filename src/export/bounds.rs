//! Range bound parsing
//!
//! Accepts what a datetime-local picker sends plus a few conveniences:
//! - `2024-01-01T10:00` / `2024-01-01T10:00:30` (wall clock in the display zone)
//! - `2024-01-01 10:00:30`
//! - RFC 3339 (`2024-01-01T10:00:00Z`)
//! - `2024-01-01` (start of that day)
//! - `now`, `now-6h`, `now-2d`, `now-1w`, `now-3m` (months of 30 days)
//! - empty string: unbounded

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use super::error::{ExportError, ExportResult};
use crate::history::{DateRange, DisplayZone};

const WALL_CLOCK_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse one bound; `None` means unbounded
pub fn parse_bound(
    s: &str,
    zone: DisplayZone,
    now: DateTime<Utc>,
) -> ExportResult<Option<DateTime<Utc>>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }

    // Handle relative times
    if s.starts_with("now") {
        if s == "now" {
            return Ok(Some(now));
        }

        let re = regex::Regex::new(r"^now-(\d+)([hdwm])$")
            .map_err(|e| ExportError::InvalidBound(e.to_string()))?;

        if let Some(caps) = re.captures(s) {
            let amount: i64 = caps[1]
                .parse()
                .map_err(|_| ExportError::InvalidBound(s.to_string()))?;

            let ago = match &caps[2] {
                "h" => Duration::try_hours(amount),
                "d" => Duration::try_days(amount),
                "w" => Duration::try_weeks(amount),
                "m" => amount.checked_mul(30).and_then(Duration::try_days),
                _ => None,
            };

            return ago
                .and_then(|ago| now.checked_sub_signed(ago))
                .map(Some)
                .ok_or_else(|| ExportError::InvalidBound(s.to_string()));
        }

        return Err(ExportError::InvalidBound(s.to_string()));
    }

    // Try ISO 8601 with offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    // Wall clock in the display zone
    for fmt in WALL_CLOCK_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return zone
                .to_utc(naive)
                .map(Some)
                .ok_or_else(|| ExportError::InvalidBound(format!("{} does not exist in {}", s, zone)));
        }
    }

    // Try date only
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).and_then(|naive| zone.to_utc(naive)));
    }

    Err(ExportError::InvalidBound(s.to_string()))
}

/// Parse an optional start and end into a range
pub fn parse_range(
    start: Option<&str>,
    end: Option<&str>,
    zone: DisplayZone,
) -> ExportResult<DateRange> {
    let now = Utc::now();
    let start = start.map(|s| parse_bound(s, zone, now)).transpose()?.flatten();
    let end = end.map(|s| parse_bound(s, zone, now)).transpose()?.flatten();
    Ok(DateRange::new(start, end))
}
