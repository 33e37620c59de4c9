//! Free-interval computation within a fixed daily working window.
//!
//! Occupied intervals for one day are sorted and merged, then the gaps
//! between them inside the window become the vacancies. The result is
//! pairwise disjoint, ascending, and clipped to the window.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::slot::Slot;
use crate::temporal::{self, hhmm, LocalNow};

// ── Types ───────────────────────────────────────────────────────────────────

/// The bookable part of a day. Defaults to 09:00–18:00 (540 minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl WorkingWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Length of the window in minutes (0 for an inverted window).
    pub fn minutes(&self) -> i64 {
        temporal::minutes_between(self.start, self.end).max(0)
    }
}

impl Default for WorkingWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// A `[start, end)` interval within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeInterval {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn minutes(&self) -> i64 {
        temporal::minutes_between(self.start, self.end)
    }
}

impl From<&Slot> for TimeInterval {
    fn from(slot: &Slot) -> Self {
        Self::new(slot.start, slot.end)
    }
}

/// One day of a weekly vacancy report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayVacancy {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub free: Vec<TimeInterval>,
    pub free_minutes: i64,
}

// ── merge_intervals ─────────────────────────────────────────────────────────

/// Sort and merge overlapping or back-to-back intervals.
///
/// Intervals with `end <= start` carry no occupancy on this day and are
/// dropped.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use slot_engine::vacancy::{merge_intervals, TimeInterval};
///
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let merged = merge_intervals(&[
///     TimeInterval::new(t(10, 0), t(11, 0)),
///     TimeInterval::new(t(9, 0), t(10, 30)),
/// ]);
/// assert_eq!(merged, vec![TimeInterval::new(t(9, 0), t(11, 0))]);
/// ```
pub fn merge_intervals(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut sorted: Vec<TimeInterval> = intervals
        .iter()
        .copied()
        .filter(|iv| {
            let keep = iv.end > iv.start;
            if !keep {
                tracing::debug!(
                    start = %iv.start,
                    end = %iv.end,
                    "ignoring empty or inverted interval"
                );
            }
            keep
        })
        .collect();
    sorted.sort_by_key(|iv| (iv.start, iv.end));

    let mut merged = Vec::with_capacity(sorted.len());
    let mut iter = sorted.into_iter();
    let Some(mut current) = iter.next() else {
        return merged;
    };
    for next in iter {
        if next.start <= current.end {
            current.end = current.end.max(next.end);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);
    merged
}

// ── vacant_intervals ────────────────────────────────────────────────────────

/// Free intervals of `window` not covered by any occupied interval.
///
/// With nothing occupied the whole window is returned as one interval. An
/// inverted window yields nothing.
///
/// The date is implied: `occupied` must already be the intervals of a single
/// day. The dated form, which also removes time already elapsed on that day,
/// is [`vacant_intervals_at`]; [`weekly_vacancy`] does the per-date grouping.
pub fn vacant_intervals(occupied: &[TimeInterval], window: WorkingWindow) -> Vec<TimeInterval> {
    if window.end <= window.start {
        return Vec::new();
    }

    let mut free = Vec::new();
    let mut cursor = window.start;
    for interval in merge_intervals(occupied) {
        if cursor >= window.end {
            break;
        }
        let gap_end = interval.start.min(window.end);
        if gap_end > cursor {
            free.push(TimeInterval::new(cursor, gap_end));
        }
        cursor = cursor.max(interval.end);
    }
    if cursor < window.end {
        free.push(TimeInterval::new(cursor, window.end));
    }
    free
}

/// [`vacant_intervals`] with elapsed time removed.
///
/// On `now.today` the window opens at `max(window.start, now.time)`; dates
/// before today have no vacancy left; later dates are unaffected.
pub fn vacant_intervals_at(
    date: NaiveDate,
    occupied: &[TimeInterval],
    window: WorkingWindow,
    now: &LocalNow,
) -> Vec<TimeInterval> {
    if date < now.today {
        return Vec::new();
    }
    let window = if date == now.today {
        WorkingWindow::new(window.start.max(now.time), window.end)
    } else {
        window
    };
    vacant_intervals(occupied, window)
}

// ── weekly_vacancy ──────────────────────────────────────────────────────────

/// Vacancy for the seven dates starting at `week_start`.
///
/// `occupied` may hold slots from any dates; each day only sees its own.
/// When `now` is given, elapsed time is excluded as in
/// [`vacant_intervals_at`].
pub fn weekly_vacancy(
    week_start: NaiveDate,
    occupied: &[Slot],
    window: WorkingWindow,
    now: Option<&LocalNow>,
) -> Vec<DayVacancy> {
    let week_end = temporal::add_days(week_start, 6).unwrap_or(week_start);
    temporal::date_range(week_start, week_end)
        .map(|date| {
            let day: Vec<TimeInterval> = occupied
                .iter()
                .filter(|slot| slot.date == date)
                .map(TimeInterval::from)
                .collect();
            let free = match now {
                Some(now) => vacant_intervals_at(date, &day, window, now),
                None => vacant_intervals(&day, window),
            };
            DayVacancy {
                date,
                weekday: date.weekday(),
                free_minutes: free.iter().map(TimeInterval::minutes).sum(),
                free,
            }
        })
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────────────
