//! The one weekday vocabulary used across the engine.
//!
//! Weekdays are always [`chrono::Weekday`]. Booking forms send labels
//! (`"Mon"`, `"Tues"`, `"Thursday"`, ...), which are parsed once at the edge
//! by [`parse_weekday`] and carried afterwards as a [`WeekdaySet`].

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// All seven weekdays in Monday-first order.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Canonical three-letter label (`Mon`, `Tue`, ... `Sun`).
pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Parse a weekday label (case-insensitive, full or abbreviated).
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidWeekday`] for anything else, including
/// misspellings such as `"Thus"`.
pub fn parse_weekday(s: &str) -> Result<Weekday, SchedulerError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "monday" | "mon" => Ok(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Ok(Weekday::Tue),
        "wednesday" | "wed" => Ok(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Ok(Weekday::Thu),
        "friday" | "fri" => Ok(Weekday::Fri),
        "saturday" | "sat" => Ok(Weekday::Sat),
        "sunday" | "sun" => Ok(Weekday::Sun),
        _ => Err(SchedulerError::InvalidWeekday(format!("'{}'", s))),
    }
}

// ── WeekdaySet ──────────────────────────────────────────────────────────────

/// A set of weekdays, stored as a 7-bit mask (bit 0 = Monday).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);
    pub const ALL: WeekdaySet = WeekdaySet(0b111_1111);

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= bit(day);
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in Monday-first order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        WEEK.into_iter().filter(|d| self.contains(*d))
    }

    /// Parse a list of labels.
    ///
    /// # Errors
    ///
    /// Fails on the first label [`parse_weekday`] rejects.
    pub fn from_labels<I, S>(labels: I) -> Result<Self, SchedulerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .map(|label| parse_weekday(label.as_ref()))
            .collect()
    }
}

fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_monday()
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl TryFrom<Vec<String>> for WeekdaySet {
    type Error = SchedulerError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        WeekdaySet::from_labels(labels)
    }
}

impl From<WeekdaySet> for Vec<String> {
    fn from(set: WeekdaySet) -> Self {
        set.iter().map(|d| weekday_label(d).to_string()).collect()
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.iter().map(weekday_label).collect();
        write!(f, "{}", labels.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weekday_aliases() {
        assert_eq!(parse_weekday("Tues").unwrap(), Weekday::Tue);
        assert_eq!(parse_weekday("tue").unwrap(), Weekday::Tue);
        assert_eq!(parse_weekday("THU").unwrap(), Weekday::Thu);
        assert_eq!(parse_weekday("Thurs").unwrap(), Weekday::Thu);
        assert_eq!(parse_weekday(" Sunday ").unwrap(), Weekday::Sun);
    }

    #[test]
    fn test_parse_weekday_rejects_misspelling() {
        assert!(matches!(
            parse_weekday("Thus"),
            Err(SchedulerError::InvalidWeekday(_))
        ));
    }

    #[test]
    fn test_set_membership_and_order() {
        let set: WeekdaySet = [Weekday::Fri, Weekday::Mon, Weekday::Wed]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 3);
        assert!(set.contains(Weekday::Wed));
        assert!(!set.contains(Weekday::Tue));
        let order: Vec<_> = set.iter().collect();
        assert_eq!(order, vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        assert_eq!(set.to_string(), "Mon,Wed,Fri");
    }

    #[test]
    fn test_set_serde_uses_canonical_labels() {
        let set: WeekdaySet = serde_json::from_str(r#"["Friday","tues","Mon"]"#).unwrap();
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"["Mon","Tue","Fri"]"#
        );
        assert!(serde_json::from_str::<WeekdaySet>(r#"["Thus"]"#).is_err());
    }

    #[test]
    fn test_empty_and_all() {
        assert!(WeekdaySet::EMPTY.is_empty());
        assert_eq!(WeekdaySet::ALL.len(), 7);
        assert_eq!(WeekdaySet::default(), WeekdaySet::EMPTY);
    }
}
