//! Date rendering and time-zone selection.

use chrono::{DateTime, FixedOffset, Local, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

static OFFSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"([+\-\s])([0-9][0-9]):?([0-9][0-9])?").expect("offset pattern"));

/// Which calendar a date is rendered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl Zone {
    /// Reads `local`, `Z`, or an offset such as `+05:00`, `-0330`, `+01`.
    /// Anything else is UTC.
    pub fn parse(tz: &str) -> Zone {
        match tz {
            "local" => Zone::Local,
            "Z" => Zone::Utc,
            _ => match parse_offset(tz) {
                Some(offset) => Zone::Fixed(offset),
                None => {
                    tracing::warn!(time_zone = tz, "unrecognized time zone, using UTC");
                    Zone::Utc
                }
            },
        }
    }
}

fn parse_offset(tz: &str) -> Option<FixedOffset> {
    let caps = OFFSET.captures(tz)?;
    let sign = if &caps[1] == "-" { -1 } else { 1 };
    let hours: i32 = caps[2].parse().ok()?;
    let minutes: i32 = caps.get(3).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    FixedOffset::east_opt(sign * (hours * 60 + minutes) * 60)
}

/// `YYYY-MM-DD HH:MM:SS.mmm` in the zone named by `tz`.
pub fn format(dt: &DateTime<Utc>, tz: &str) -> String {
    match Zone::parse(tz) {
        Zone::Local => dt.with_timezone(&Local).format(FORMAT).to_string(),
        Zone::Utc => dt.format(FORMAT).to_string(),
        Zone::Fixed(offset) => dt.with_timezone(&offset).format(FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn y2k() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn utc_and_unknown_zones() {
        assert_eq!(format(&y2k(), "Z"), "2000-01-01 00:00:00.000");
        assert_eq!(format(&y2k(), "GMT"), "2000-01-01 00:00:00.000");
        assert_eq!(format(&y2k(), "Mars/Olympus"), "2000-01-01 00:00:00.000");
    }

    #[test]
    fn offsets_shift_the_calendar() {
        assert_eq!(format(&y2k(), "+05:30"), "2000-01-01 05:30:00.000");
        assert_eq!(format(&y2k(), "-0100"), "1999-12-31 23:00:00.000");
        assert_eq!(format(&y2k(), "+01"), "2000-01-01 01:00:00.000");
    }

    #[test]
    fn millis_are_kept() {
        let dt = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap() + chrono::Duration::milliseconds(89);
        assert_eq!(format(&dt, "Z"), "2021-03-04 05:06:07.089");
    }

    #[test]
    fn out_of_range_offsets_fall_back() {
        assert_eq!(Zone::parse("+99"), Zone::Utc);
        assert_eq!(Zone::parse("local"), Zone::Local);
    }
}
