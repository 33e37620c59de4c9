//! The slot value type: one calendar interval on one date.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::temporal::{self, hhmm};

/// A `(date, start, end)` interval, either a candidate booking or an
/// existing occupancy / maintenance window.
///
/// `end > start` is expected on the generation and detection paths but not
/// enforced here; the weekly aggregator reads `end < start` as an overnight
/// booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// Unique within a batch; the lookup key during conflict resolution.
    pub id: String,
    /// Calendar date (`YYYY-MM-DD`).
    pub date: NaiveDate,
    /// Start time (`HH:MM`).
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    /// End time (`HH:MM`).
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl Slot {
    pub fn new(id: impl Into<String>, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            id: id.into(),
            date,
            start,
            end,
        }
    }

    /// Whether two slots collide.
    ///
    /// Slots on different dates never collide. On the same date the test is
    /// half-open interval intersection, so back-to-back slots
    /// (`self.end == other.start`) do not conflict.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{NaiveDate, NaiveTime};
    /// use slot_engine::Slot;
    ///
    /// let day = NaiveDate::from_ymd_opt(2025, 8, 13).unwrap();
    /// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
    /// let booked = Slot::new("a", day, t(9, 0), t(10, 0));
    ///
    /// assert!(Slot::new("b", day, t(9, 30), t(10, 30)).overlaps(&booked));
    /// assert!(!Slot::new("c", day, t(10, 0), t(11, 0)).overlaps(&booked));
    /// ```
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.date == other.date && self.start < other.end && other.start < self.end
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// Length in minutes on a single day (negative when `end < start`).
    pub fn duration_minutes(&self) -> i64 {
        temporal::minutes_between(self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: &str, d: u32, sh: u32, sm: u32, eh: u32, em: u32) -> Slot {
        Slot::new(
            id,
            NaiveDate::from_ymd_opt(2025, 8, d).unwrap(),
            NaiveTime::from_hms_opt(sh, sm, 0).unwrap(),
            NaiveTime::from_hms_opt(eh, em, 0).unwrap(),
        )
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = slot("a", 13, 9, 0, 10, 0);
        let b = slot("b", 13, 9, 30, 10, 30);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_touching_boundaries_do_not_overlap() {
        let a = slot("a", 13, 9, 0, 10, 0);
        let b = slot("b", 13, 10, 0, 11, 0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = slot("a", 13, 8, 0, 12, 0);
        let inner = slot("b", 13, 9, 0, 9, 15);
        assert!(outer.overlaps(&inner));
    }

    #[test]
    fn test_different_dates_never_overlap() {
        let a = slot("a", 13, 9, 0, 10, 0);
        let b = slot("b", 14, 9, 0, 10, 0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_weekday_and_duration() {
        let s = slot("a", 13, 9, 0, 10, 30);
        assert_eq!(s.weekday(), Weekday::Wed);
        assert_eq!(s.duration_minutes(), 90);
    }

    #[test]
    fn test_serde_wire_shape() {
        let s = slot("x", 13, 9, 0, 10, 0);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(
            json,
            r#"{"id":"x","date":"2025-08-13","start":"09:00","end":"10:00"}"#
        );
        let back: Slot = serde_json::from_str(
            r#"{"id":"x","date":"2025-08-13","start":"09:00:00","end":"10:00"}"#,
        )
        .unwrap();
        assert_eq!(back, s);
    }
}
