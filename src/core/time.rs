//! Time representation for video/audio synchronization.
//! The game clock and the media backend both report seconds, the persisted
//! association stores its offset in milliseconds.

use std::fmt;

/// Time in seconds since the start of a level or video
pub type Seconds = f64;

/// Time constants for conversions
pub mod constants {
    pub const MILLIS_PER_SECOND: f64 = 1000.0;
    pub const SECONDS_PER_MINUTE: u64 = 60;
    pub const SECONDS_PER_HOUR: u64 = 3600;
    pub const SECONDS_PER_DAY: u64 = 86_400;
    /// Frame rate assumed when the backend has not reported one yet
    pub const FALLBACK_FRAME_RATE: f64 = 30.0;
}

/// Convert milliseconds to seconds
#[inline]
pub fn from_millis(millis: i32) -> Seconds {
    f64::from(millis) / constants::MILLIS_PER_SECOND
}

/// Duration of a single frame at the given frame rate.
/// Non-positive or non-finite rates fall back to 30 fps.
#[inline]
pub fn frame_duration(frame_rate: f64) -> Seconds {
    if frame_rate.is_finite() && frame_rate > 0.0 {
        1.0 / frame_rate
    } else {
        1.0 / constants::FALLBACK_FRAME_RATE
    }
}

/// Express a time span as a (fractional, signed) number of frames
#[inline]
pub fn to_frames(seconds: Seconds, frame_duration: Seconds) -> f64 {
    seconds / frame_duration
}

/// Error returned by [`parse_clock`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clock string: {0:?}")]
pub struct ClockParseError(pub String);

/// Parse a bare clock string into seconds.
///
/// Accepted shapes:
/// - `D` whole days
/// - `H:M` hours and minutes
/// - `H:M:S[.fff]` hours, minutes, seconds
/// - `D.H:M:S[.fff]` days, hours, minutes, seconds
///
/// A single colon is always read as hours and minutes, never as minutes and
/// seconds. Hours must be below 24 and minutes/seconds below 60.
pub fn parse_clock(text: &str) -> Result<Seconds, ClockParseError> {
    let err = || ClockParseError(text.to_string());
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(err());
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    match parts.as_slice() {
        [days] => {
            let days = parse_component(days, u64::MAX).ok_or_else(err)?;
            Ok(days.saturating_mul(constants::SECONDS_PER_DAY) as Seconds)
        }
        [hours, minutes] => {
            let (days, hours) = split_days(hours).ok_or_else(err)?;
            let minutes = parse_component(minutes, 59).ok_or_else(err)?;
            Ok(whole_seconds(days, hours, minutes, 0) as Seconds)
        }
        [hours, minutes, seconds] => {
            let (days, hours) = split_days(hours).ok_or_else(err)?;
            let minutes = parse_component(minutes, 59).ok_or_else(err)?;
            let (seconds, fraction) = split_fraction(seconds).ok_or_else(err)?;
            Ok(whole_seconds(days, hours, minutes, seconds) as Seconds + fraction)
        }
        _ => Err(err()),
    }
}

/// Format seconds as `H:MM:SS` (or `M:SS` below one hour)
pub fn format_clock(seconds: u64) -> String {
    ClockDisplay(seconds).to_string()
}

struct ClockDisplay(u64);

impl fmt::Display for ClockDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / constants::SECONDS_PER_HOUR;
        let minutes = (self.0 % constants::SECONDS_PER_HOUR) / constants::SECONDS_PER_MINUTE;
        let seconds = self.0 % constants::SECONDS_PER_MINUTE;
        if hours > 0 {
            write!(f, "{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            write!(f, "{}:{:02}", minutes, seconds)
        }
    }
}

fn whole_seconds(days: u64, hours: u64, minutes: u64, seconds: u64) -> u64 {
    let within_day = hours * constants::SECONDS_PER_HOUR
        + minutes * constants::SECONDS_PER_MINUTE
        + seconds;
    days.saturating_mul(constants::SECONDS_PER_DAY).saturating_add(within_day)
}

fn parse_component(text: &str, max: u64) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u64>().ok().filter(|value| *value <= max)
}

/// `D.H` or `H` leading component
fn split_days(text: &str) -> Option<(u64, u64)> {
    match text.split_once('.') {
        Some((days, hours)) => {
            Some((parse_component(days, u64::MAX)?, parse_component(hours, 23)?))
        }
        None => Some((0, parse_component(text, 23)?)),
    }
}

/// `S` or `S.fff` trailing component
fn split_fraction(text: &str) -> Option<(u64, f64)> {
    match text.split_once('.') {
        Some((seconds, fraction)) => {
            let seconds = parse_component(seconds, 59)?;
            parse_component(fraction, u64::MAX)?;
            let fraction: f64 = format!("0.{}", fraction).parse().ok()?;
            Some((seconds, fraction))
        }
        None => Some((parse_component(text, 59)?, 0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_conversion() {
        assert!((from_millis(1500) - 1.5).abs() < 1e-9);
        assert!((from_millis(-300) + 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_frame_duration() {
        assert!((frame_duration(60.0) - 1.0 / 60.0).abs() < 1e-12);
        assert!((frame_duration(0.0) - 1.0 / 30.0).abs() < 1e-12);
        assert!((frame_duration(f64::NAN) - 1.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_to_frames() {
        let frames = to_frames(0.1, frame_duration(30.0));
        assert!((frames - 3.0).abs() < 1e-9);
        assert!(to_frames(-0.1, frame_duration(30.0)) < 0.0);
    }

    #[test]
    fn test_parse_clock_hours_minutes_seconds() {
        assert_eq!(parse_clock("1:02:03"), Ok(3723.0));
        assert_eq!(parse_clock("0:00:00"), Ok(0.0));
    }

    #[test]
    fn test_parse_clock_single_colon_is_hours_minutes() {
        assert_eq!(parse_clock("3:25"), Ok(3.0 * 3600.0 + 25.0 * 60.0));
        assert_eq!(parse_clock("0:00"), Ok(0.0));
    }

    #[test]
    fn test_parse_clock_days_and_fraction() {
        assert_eq!(parse_clock("2"), Ok(2.0 * 86_400.0));
        assert_eq!(parse_clock("1.01:00:00"), Ok(86_400.0 + 3600.0));
        assert_eq!(parse_clock("0:00:01.5"), Ok(1.5));
    }

    #[test]
    fn test_parse_clock_rejects_out_of_range() {
        assert!(parse_clock("24:00").is_err());
        assert!(parse_clock("1:60").is_err());
        assert!(parse_clock("1:00:60").is_err());
        assert!(parse_clock("").is_err());
        assert!(parse_clock("a:bc").is_err());
        assert!(parse_clock("1:2:3:4").is_err());
        assert!(parse_clock("-1:00").is_err());
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(205), "3:25");
        assert_eq!(format_clock(3723), "1:02:03");
    }
}
