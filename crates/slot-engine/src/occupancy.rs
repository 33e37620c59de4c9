//! Weekly occupancy totals and utilization for room reports.
//!
//! Each occupant record contributes its duration to the weekday on which it
//! starts. A record whose end time is earlier than its start time is read as
//! running past midnight into the next day. Records whose date or times do
//! not parse are skipped and counted, never fatal.
//!
//! Durations are measured from the times as written, seconds included, so
//! totals are fractional minutes.

use chrono::{Datelike, NaiveDateTime, Weekday};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::SchedulerError;
use crate::records::OccupantRecord;
use crate::temporal;
use crate::vacancy::WorkingWindow;
use crate::weekday::{weekday_label, WEEK};

// ── WeeklyTotals ────────────────────────────────────────────────────────────

/// Occupied minutes per weekday plus the weekly sum.
///
/// Serializes as `{"Mon": .., ..., "Sun": .., "Weekly": .., "skipped": ..}`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeeklyTotals {
    minutes: [f64; 7],
    skipped: usize,
}

impl WeeklyTotals {
    /// Minutes booked on `day`.
    pub fn minutes(&self, day: Weekday) -> f64 {
        self.minutes[day.num_days_from_monday() as usize]
    }

    /// Sum of all seven weekdays.
    pub fn weekly(&self) -> f64 {
        self.minutes.iter().sum()
    }

    /// Number of records that could not be parsed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// `(weekday, minutes)` pairs, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, f64)> + '_ {
        WEEK.into_iter().map(|day| (day, self.minutes(day)))
    }

    fn add(&mut self, day: Weekday, minutes: f64) {
        self.minutes[day.num_days_from_monday() as usize] += minutes;
    }
}

impl Serialize for WeeklyTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("WeeklyTotals", 9)?;
        for (day, minutes) in self.iter() {
            state.serialize_field(weekday_label(day), &minutes)?;
        }
        state.serialize_field("Weekly", &self.weekly())?;
        state.serialize_field("skipped", &self.skipped)?;
        state.end()
    }
}

// ── weekly_totals ───────────────────────────────────────────────────────────

/// Aggregate occupant records into per-weekday minutes.
///
/// # Examples
///
/// ```
/// use chrono::Weekday;
/// use slot_engine::records::OccupantRecord;
/// use slot_engine::occupancy::weekly_totals;
///
/// let overnight = OccupantRecord {
///     scheduled_date: "2025-08-13".into(),
///     start_time: "23:00".into(),
///     end_time: "01:00".into(),
///     ..Default::default()
/// };
/// let totals = weekly_totals(&[overnight]);
/// assert_eq!(totals.minutes(Weekday::Wed), 120.0);
/// assert_eq!(totals.weekly(), 120.0);
/// ```
pub fn weekly_totals(occupants: &[OccupantRecord]) -> WeeklyTotals {
    let mut totals = WeeklyTotals::default();
    for record in occupants {
        match occupied_span(record) {
            Ok((start, end)) => totals.add(start.weekday(), span_minutes(start, end)),
            Err(err) => {
                tracing::debug!(
                    occupant = record.occupant_id.as_deref().unwrap_or("?"),
                    error = %err,
                    "skipping occupant record in weekly totals"
                );
                totals.skipped += 1;
            }
        }
    }
    totals
}

/// Start and end timestamps of a record, with the overnight rule applied.
fn occupied_span(
    record: &OccupantRecord,
) -> Result<(NaiveDateTime, NaiveDateTime), SchedulerError> {
    let date = temporal::parse_date(&record.scheduled_date)?;
    let start = date.and_time(temporal::parse_time_exact(&record.start_time)?);
    let mut end = date.and_time(temporal::parse_time_exact(&record.end_time)?);
    if end < start {
        end = temporal::add_days(date, 1)
            .map(|next| next.and_time(end.time()))
            .ok_or_else(|| SchedulerError::InvalidDate(format!("'{}': overflow", date)))?;
    }
    Ok((start, end))
}

fn span_minutes(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_milliseconds() as f64 / 60_000.0
}

// ── Utilization ─────────────────────────────────────────────────────────────

/// Percentage of the working window that is booked, per weekday and overall.
///
/// With the default 09:00–18:00 window a day is 540 minutes and a week
/// 3780. Values above 100 are possible when bookings fall outside the window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Utilization {
    per_day: [f64; 7],
    weekly: f64,
}

impl Utilization {
    pub fn from_totals(totals: &WeeklyTotals, window: WorkingWindow) -> Self {
        let day_minutes = window.minutes();
        let percent = |minutes: f64, capacity: i64| {
            if capacity == 0 {
                0.0
            } else {
                (minutes * 100.0) / capacity as f64
            }
        };
        let mut per_day = [0.0; 7];
        for (day, minutes) in totals.iter() {
            per_day[day.num_days_from_monday() as usize] = percent(minutes, day_minutes);
        }
        Self {
            per_day,
            weekly: percent(totals.weekly(), day_minutes * 7),
        }
    }

    pub fn percent(&self, day: Weekday) -> f64 {
        self.per_day[day.num_days_from_monday() as usize]
    }

    pub fn weekly(&self) -> f64 {
        self.weekly
    }
}

impl Serialize for Utilization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Utilization", 8)?;
        for day in WEEK {
            state.serialize_field(weekday_label(day), &self.percent(day))?;
        }
        state.serialize_field("Weekly", &self.weekly)?;
        state.end()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
