//! Recurrence expansion: booking request → ordered list of concrete slots.
//!
//! A request names a start date, a [`Recurrence`] kind that fixes the end of
//! the span, a weekday filter, and one daily time window. Expansion walks
//! every date of the span and emits a slot on each selected weekday.
//!
//! | kind            | end date                          |
//! |-----------------|-----------------------------------|
//! | `day`           | the start date (filter ignored)   |
//! | `week`          | start + 6 days                    |
//! | `month`         | start + 1 month − 1 day           |
//! | `activeSession` | the academic session's last day   |
//! | `custom`        | the explicit end date             |
//!
//! Malformed-but-typed input never errors: an empty weekday filter or an end
//! date before the start simply yields no slots.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;
use crate::slot::Slot;
use crate::temporal::{self, hhmm};
use crate::weekday::WeekdaySet;

/// Upper bound on the number of days one request may span (two years).
pub const DEFAULT_MAX_EXPANSION_DAYS: u32 = 731;

/// How the end of a booking span is derived from its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Recurrence {
    /// A single occurrence on the start date.
    Day,
    /// Seven days starting on the start date.
    Week,
    /// One calendar month starting on the start date.
    Month,
    /// Until the end of the current academic session.
    ActiveSession {
        #[serde(rename = "sessionEnd")]
        session_end: NaiveDate,
    },
    /// Until an explicit end date.
    Custom {
        #[serde(rename = "endDate")]
        end_date: NaiveDate,
    },
}

impl Recurrence {
    /// Last date of the span that starts on `start`. `None` only on date overflow.
    pub fn end_date(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Recurrence::Day => Some(start),
            Recurrence::Week => temporal::add_days(start, 6),
            Recurrence::Month => {
                temporal::add_months(start, 1).and_then(|d| temporal::add_days(d, -1))
            }
            Recurrence::ActiveSession { session_end } => Some(*session_end),
            Recurrence::Custom { end_date } => Some(*end_date),
        }
    }
}

/// One booking request as submitted by the booking form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub start_date: NaiveDate,
    #[serde(flatten)]
    pub recurrence: Recurrence,
    /// Ignored for [`Recurrence::Day`].
    #[serde(default)]
    pub weekdays: WeekdaySet,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl BookingRequest {
    /// Expand with the default span limit. See [`expand_with_limit`].
    pub fn expand(&self) -> Vec<Slot> {
        expand_with_limit(self, DEFAULT_MAX_EXPANSION_DAYS)
    }

    /// Render the request as an RFC 5545 `DTSTART` + `RRULE` pair.
    ///
    /// Returns `None` when the request would expand to nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{NaiveDate, NaiveTime, Weekday};
    /// use slot_engine::{BookingRequest, Recurrence, WeekdaySet};
    ///
    /// let request = BookingRequest {
    ///     start_date: NaiveDate::from_ymd_opt(2025, 8, 13).unwrap(),
    ///     recurrence: Recurrence::Week,
    ///     weekdays: [Weekday::Mon, Weekday::Wed].into_iter().collect::<WeekdaySet>(),
    ///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    ///     end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
    /// };
    /// assert_eq!(
    ///     request.to_rrule().unwrap(),
    ///     "DTSTART:20250813T090000Z\nRRULE:FREQ=DAILY;UNTIL=20250819T235959Z;BYDAY=MO,WE"
    /// );
    /// ```
    pub fn to_rrule(&self) -> Option<String> {
        let end = self.recurrence.end_date(self.start_date)?;
        if end < self.start_date {
            return None;
        }
        let dtstart = format!(
            "DTSTART:{}T{}Z",
            self.start_date.format("%Y%m%d"),
            self.start_time.format("%H%M%S")
        );
        if self.recurrence == Recurrence::Day {
            return Some(format!("{dtstart}\nRRULE:FREQ=DAILY;COUNT=1"));
        }
        if self.weekdays.is_empty() {
            return None;
        }
        let byday: Vec<&str> = self.weekdays.iter().map(rrule_day_code).collect();
        Some(format!(
            "{dtstart}\nRRULE:FREQ=DAILY;UNTIL={}T235959Z;BYDAY={}",
            end.format("%Y%m%d"),
            byday.join(",")
        ))
    }

    /// Parse [`BookingRequest::to_rrule`] into an [`RRuleSet`] for export to
    /// calendar tooling.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidRule`] if the request expands to
    /// nothing or the rendered rule is rejected by the `rrule` parser.
    pub fn rrule_set(&self) -> Result<RRuleSet, SchedulerError> {
        let rule = self
            .to_rrule()
            .ok_or_else(|| SchedulerError::InvalidRule("request expands to no slots".into()))?;
        rule.parse::<RRuleSet>()
            .map_err(|e| SchedulerError::InvalidRule(format!("'{}': {}", rule, e)))
    }
}

fn rrule_day_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

// ── expand ──────────────────────────────────────────────────────────────────

/// Expand a booking into slots, ascending by date.
///
/// # Arguments
///
/// * `start_date` — first date of the span
/// * `recurrence` — fixes the last date of the span
/// * `weekdays` — which weekdays produce a slot (ignored for `Day`)
/// * `start_time` / `end_time` — the daily window, identical on every slot
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime, Weekday};
/// use slot_engine::recurrence::{expand, Recurrence};
///
/// let wed = NaiveDate::from_ymd_opt(2025, 8, 13).unwrap();
/// let slots = expand(
///     wed,
///     Recurrence::Week,
///     [Weekday::Mon, Weekday::Wed, Weekday::Fri].into_iter().collect(),
///     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
/// );
/// let dates: Vec<String> = slots.iter().map(|s| s.date.to_string()).collect();
/// assert_eq!(dates, ["2025-08-13", "2025-08-15", "2025-08-18"]);
/// ```
pub fn expand(
    start_date: NaiveDate,
    recurrence: Recurrence,
    weekdays: WeekdaySet,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Vec<Slot> {
    let request = BookingRequest {
        start_date,
        recurrence,
        weekdays,
        start_time,
        end_time,
    };
    request.expand()
}

/// Expand a booking, truncating spans longer than `max_days`.
///
/// Truncation is logged at `warn` and yields the leading part of the span.
pub fn expand_with_limit(request: &BookingRequest, max_days: u32) -> Vec<Slot> {
    let start = request.start_date;
    let slot_on = |idx: usize, date: NaiveDate| {
        Slot::new(
            format!("{}-{}", date.format("%Y%m%d"), idx),
            date,
            request.start_time,
            request.end_time,
        )
    };

    if request.recurrence == Recurrence::Day {
        return vec![slot_on(0, start)];
    }
    if request.weekdays.is_empty() {
        return Vec::new();
    }
    let Some(mut end) = request.recurrence.end_date(start) else {
        return Vec::new();
    };

    let span_days = (end - start).num_days() + 1;
    if span_days > i64::from(max_days) {
        let capped = temporal::add_days(start, i64::from(max_days) - 1).unwrap_or(start);
        tracing::warn!(
            start = %start,
            requested_end = %end,
            capped_end = %capped,
            max_days,
            "booking span exceeds expansion limit, truncating"
        );
        end = capped;
    }

    temporal::date_range(start, end)
        .filter(|date| request.weekdays.contains(date.weekday()))
        .enumerate()
        .map(|(idx, date)| slot_on(idx, date))
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────────────
