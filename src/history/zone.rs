//! Display time zone
//!
//! Readings are stored in UTC. Labels, CSV timestamps and user-entered
//! datetime-local bounds are interpreted in one configured zone: the host's
//! local zone or a fixed UTC offset.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

/// Zone used for everything a human reads or types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// The host's local zone
    #[default]
    Local,
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn utc() -> Self {
        DisplayZone::Fixed(Utc.fix())
    }

    /// Format a UTC instant in this zone
    pub fn format(&self, timestamp: DateTime<Utc>, fmt: &str) -> String {
        match self {
            DisplayZone::Local => timestamp.with_timezone(&Local).format(fmt).to_string(),
            DisplayZone::Fixed(offset) => timestamp.with_timezone(offset).format(fmt).to_string(),
        }
    }

    /// Interpret a wall-clock time in this zone.
    ///
    /// Ambiguous local times (DST fall-back) resolve to the earlier instant;
    /// non-existent ones (DST spring-forward gap) yield `None`.
    pub fn to_utc(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            DisplayZone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            DisplayZone::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl FromStr for DisplayZone {
    type Err = String;

    /// Accepts `local`, `utc`, `Z`, `+07:00`, `-0530`, `+7`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "" | "local" => return Ok(DisplayZone::Local),
            "utc" | "z" => return Ok(DisplayZone::utc()),
            _ => {}
        }

        let invalid = || format!("Invalid UTC offset: {}. Use: local, utc, +07:00", s);

        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => return Err(invalid()),
        };

        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h, m),
            None if rest.len() == 4 && rest.is_char_boundary(2) => rest.split_at(2),
            None => (rest, "0"),
        };

        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(DisplayZone::Fixed)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayZone::Local => write!(f, "local"),
            DisplayZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}
