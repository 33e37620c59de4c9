//! Calendar value helpers shared by every scheduling component.
//!
//! Dates are [`NaiveDate`] and wall-clock times are [`NaiveTime`]: immutable
//! values with explicit add-days / add-months arithmetic, so no component
//! ever mutates a date in place or drifts across a timezone boundary.
//!
//! Nothing in this crate reads the system clock. Whenever "now" matters
//! (temporal validity of an edited slot, clamping today's vacancy) the caller
//! passes a [`LocalNow`] anchor, keeping every function deterministic and
//! testable.
//!
//! # Functions
//!
//! - [`parse_date`] / [`parse_time`] — lenient parsing of upstream record fields
//! - [`parse_time_exact`] — the same, keeping seconds
//! - [`add_days`] / [`add_months`] — calendar arithmetic
//! - [`date_range`] — inclusive iteration over a date span
//! - [`format_hhmm`] / [`format_hhmmss`] — wire formatting of times

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

// ── LocalNow ────────────────────────────────────────────────────────────────

/// The caller's "now", expressed as a local calendar date and minute.
///
/// Seconds are truncated: a slot starting at 10:00 is still valid at
/// 10:00:45, matching the minute resolution of every slot in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalNow {
    /// Today's date in the campus timezone.
    pub today: NaiveDate,
    /// Current wall-clock time in the campus timezone.
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
}

impl LocalNow {
    /// Build an anchor from an explicit local date and time.
    pub fn new(today: NaiveDate, time: NaiveTime) -> Self {
        Self {
            today,
            time: truncate_to_minute(time),
        }
    }

    /// Project a UTC instant into the given timezone.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    /// use slot_engine::temporal::LocalNow;
    ///
    /// let anchor = Utc.with_ymd_and_hms(2025, 8, 13, 4, 0, 30).unwrap();
    /// let now = LocalNow::from_utc(anchor, chrono_tz::Asia::Kolkata);
    /// assert_eq!(now.today, NaiveDate::from_ymd_opt(2025, 8, 13).unwrap());
    /// assert_eq!(now.time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    /// ```
    pub fn from_utc(anchor: DateTime<Utc>, tz: Tz) -> Self {
        let local = anchor.with_timezone(&tz);
        Self::new(local.date_naive(), local.time())
    }

    /// Like [`LocalNow::from_utc`], with the timezone given as an IANA name.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidTimezone`] for an unknown timezone name.
    pub fn resolve(anchor: DateTime<Utc>, timezone: &str) -> Result<Self, SchedulerError> {
        Ok(Self::from_utc(anchor, parse_timezone(timezone)?))
    }
}

// ── Arithmetic ──────────────────────────────────────────────────────────────

/// Add (or subtract, for negative `days`) whole days. `None` on overflow.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// Add whole months, clamping to the last day of a shorter target month
/// (Jan 31 + 1 month = Feb 28 or 29). `None` on overflow.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Every date from `start` to `end`, both inclusive. Empty when `end < start`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Minutes between two times of the same day (negative if `end < start`).
pub fn minutes_between(start: NaiveTime, end: NaiveTime) -> i64 {
    (end - start).num_minutes()
}

// ── Parsing ─────────────────────────────────────────────────────────────────

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz, SchedulerError> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| SchedulerError::InvalidTimezone(format!("'{}'", s)))
}

/// Parse a calendar date.
///
/// Accepts `YYYY-MM-DD`, or any ISO datetime whose date part precedes a `T`
/// or a space (`2025-08-13T00:00:00Z`, `2025-08-13 09:00:00`).
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidDate`] if no date can be read.
pub fn parse_date(s: &str) -> Result<NaiveDate, SchedulerError> {
    let trimmed = s.trim();
    let head = trimmed
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .map_err(|e| SchedulerError::InvalidDate(format!("'{}': {}", s, e)))
}

/// Parse a wall-clock time, truncated to the minute.
///
/// Accepts `HH:MM`, `HH:MM:SS`, `HH:MM:SS.fff`, 12-hour `hh:MM AM`, and ISO
/// datetimes with the time embedded (`2025-08-13T09:00:00Z`). Any zone
/// suffix is dropped: the wall-clock part is taken as local time.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidTime`] if no time can be read.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use slot_engine::temporal::parse_time;
///
/// let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
/// assert_eq!(parse_time("09:00").unwrap(), nine);
/// assert_eq!(parse_time("09:00:00").unwrap(), nine);
/// assert_eq!(parse_time("2025-08-13T09:00:00.000Z").unwrap(), nine);
/// assert!(parse_time("nine-ish").is_err());
/// ```
pub fn parse_time(s: &str) -> Result<NaiveTime, SchedulerError> {
    parse_time_exact(s).map(truncate_to_minute)
}

/// [`parse_time`] without the truncation: seconds and fractions are kept.
///
/// Used where durations are summed, so that `09:00:30`–`10:00:00` counts as
/// 59.5 minutes rather than 60.
pub fn parse_time_exact(s: &str) -> Result<NaiveTime, SchedulerError> {
    let clock = strip_date_and_zone(s.trim());

    const FORMATS: [&str; 4] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M", "%I:%M %p"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(clock, fmt).ok())
        .ok_or_else(|| SchedulerError::InvalidTime(format!("'{}'", s)))
}

/// Reduce `2025-08-13T09:00:00+05:30` to `09:00:00`.
fn strip_date_and_zone(s: &str) -> &str {
    let clock = match s.split_once('T') {
        Some((_, rest)) => rest,
        None => match s.split_once(' ') {
            Some((head, rest)) if head.contains('-') => rest,
            _ => s,
        },
    };
    // A zone marker never appears in the first two characters of a clock time.
    match clock
        .char_indices()
        .skip(2)
        .find(|(_, c)| matches!(c, 'Z' | 'z' | '+' | '-'))
    {
        Some((idx, _)) => &clock[..idx],
        None => clock,
    }
}

fn truncate_to_minute(t: NaiveTime) -> NaiveTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

// ── Formatting ──────────────────────────────────────────────────────────────

/// `09:05`
pub fn format_hhmm(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// `09:05:00`, the allocation-write format.
pub fn format_hhmmss(t: NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}

/// Serde adapter writing [`NaiveTime`] as `HH:MM` and reading anything
/// [`parse_time`] accepts.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hhmm(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
