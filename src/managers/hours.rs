//! "Open now" evaluation against weekly operating hours.
//!
//! Hours are stored per weekday as `HH:MM-HH:MM`. A span whose end is earlier
//! than its start wraps past midnight. Anything unparsable counts as closed.

use super::restaurant::Hours;
use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use std::fmt;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn day_key(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Resolves the reference instant in one fixed timezone.
#[derive(Clone, Copy)]
pub struct OpenNowEvaluator {
    timezone: Tz,
}

impl fmt::Debug for OpenNowEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenNowEvaluator")
            .field("timezone", &self.timezone.name())
            .finish()
    }
}

impl OpenNowEvaluator {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Local wall-clock time and weekday for the given instant.
    pub fn reference(&self, instant: DateTime<Utc>) -> (NaiveTime, Weekday) {
        let local = instant.with_timezone(&self.timezone);
        (local.time(), local.weekday())
    }

    pub fn is_open_at(&self, hours: &Hours, instant: DateTime<Utc>) -> bool {
        let (time, weekday) = self.reference(instant);
        is_open_now(hours, time, weekday)
    }
}

pub fn is_open_now(hours: &Hours, time: NaiveTime, weekday: Weekday) -> bool {
    let span = match hours.get(day_key(weekday)).and_then(Option::as_deref) {
        Some(span) if !span.trim().is_empty() => span,
        _ => return false,
    };
    let (start, end) = match parse_span(span) {
        Some(bounds) => bounds,
        None => return false,
    };
    if end >= start {
        start <= time && time <= end
    } else {
        time >= start || time <= end
    }
}

fn parse_span(span: &str) -> Option<(NaiveTime, NaiveTime)> {
    let parts: Vec<&str> = span.split('-').collect();
    if parts.len() != 2 {
        return None;
    }
    Some((parse_clock(parts[0].trim())?, parse_clock(parts[1].trim())?))
}

/// Strict `HH:MM`, two digits each.
fn parse_clock(value: &str) -> Option<NaiveTime> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    let hour = two_digits(&bytes[0..2])?;
    let minute = two_digits(&bytes[3..5])?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.iter().all(u8::is_ascii_digit) {
        Some(u32::from(bytes[0] - b'0') * 10 + u32::from(bytes[1] - b'0'))
    } else {
        None
    }
}
