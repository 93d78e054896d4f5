//! Timestamp formats and timezone helpers.
//!
//! [`CANONICAL_FORMAT`] renders an instant in UTC with an explicit offset
//! (`2024-05-11T04:50:00+00:00`). It is the join key between duties and
//! published events, and it is what the event directory receives.
//!
//! Calendar export works on the wall clock of a named zone instead, see
//! [`to_local_wall_clock`].

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Canonical timestamp format, always rendered from UTC.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// The canonical string form of an event start instant.
///
/// Two instants that render identically are the same event, even if the
/// remote side reported sub-second precision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventKey(String);

impl EventKey {
    /// Formats an instant into its key.
    pub fn from_instant(instant: &DateTime<Utc>) -> Self {
        Self(format_canonical(instant))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Formats an instant with [`CANONICAL_FORMAT`].
pub fn format_canonical(instant: &DateTime<Utc>) -> String {
    instant.format(CANONICAL_FORMAT).to_string()
}

/// Parses an ISO-8601 timestamp with offset into a UTC instant.
pub fn parse_timestamp(value: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::invalid_timestamp(value, e))
}

/// Resolves an IANA timezone name.
pub fn parse_timezone(name: &str) -> CoreResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| CoreError::UnknownTimezone {
            name: name.to_string(),
        })
}

/// Converts an instant into the wall clock of `tz`.
pub fn to_local_wall_clock(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDateTime {
    instant.with_timezone(tz).naive_local()
}

/// Resolves `date` at `time` in `tz` to an instant.
///
/// Ambiguous times (DST fold) resolve to the earlier instant; times inside a
/// DST gap are an error.
pub fn local_instant(date: NaiveDate, time: NaiveTime, tz: &Tz) -> CoreResult<DateTime<Utc>> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| CoreError::NonexistentLocalTime {
            value: naive.to_string(),
            timezone: tz.name().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn canonical_format_is_utc_with_offset() {
        let key = EventKey::from_instant(&utc(2024, 5, 11, 4, 50));
        assert_eq!(key.as_str(), "2024-05-11T04:50:00+00:00");
    }

    #[test]
    fn key_ignores_source_offset_and_precision() {
        let a = parse_timestamp("2024-05-10T21:50:00-07:00").unwrap();
        let b = parse_timestamp("2024-05-11T04:50:00.000000+00:00").unwrap();
        assert_eq!(EventKey::from_instant(&a), EventKey::from_instant(&b));
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        let err = parse_timestamp("tomorrow").unwrap_err();
        assert!(matches!(err, CoreError::InvalidTimestamp { .. }));
    }

    #[test]
    fn parse_timezone_known_and_unknown() {
        assert_eq!(parse_timezone("Asia/Tokyo").unwrap(), chrono_tz::Asia::Tokyo);
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(CoreError::UnknownTimezone { .. })
        ));
    }

    #[test]
    fn wall_clock_drops_the_offset() {
        let tz = parse_timezone("Asia/Tokyo").unwrap();
        let local = to_local_wall_clock(&utc(2024, 5, 11, 4, 50), &tz);
        assert_eq!(local.to_string(), "2024-05-11 13:50:00");
    }

    #[test]
    fn local_instant_in_zone() {
        let tz = parse_timezone("Asia/Tokyo").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let time = NaiveTime::from_hms_opt(21, 50, 0).unwrap();
        assert_eq!(local_instant(date, time, &tz).unwrap(), utc(2024, 5, 10, 12, 50));
    }

    #[test]
    fn local_instant_in_dst_gap_errors() {
        let tz = parse_timezone("America/Los_Angeles").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let time = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        assert!(matches!(
            local_instant(date, time, &tz),
            Err(CoreError::NonexistentLocalTime { .. })
        ));
    }
}
