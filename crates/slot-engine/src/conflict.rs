//! Conflict detection between candidate slots and existing bookings.
//!
//! Every check in the system (submission validation, live indicators while
//! editing, maintenance-vs-booking) goes through [`Slot::overlaps`]: same
//! date and half-open interval intersection.

use serde::{Deserialize, Serialize};

use crate::slot::Slot;

/// A candidate slot together with the existing slots it collides with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictInfo {
    pub slot: Slot,
    pub conflicting_existing: Vec<Slot>,
}

/// Existing slots that collide with `candidate`.
pub fn conflicts_with<'a>(candidate: &Slot, existing: &'a [Slot]) -> Vec<&'a Slot> {
    existing.iter().filter(|e| candidate.overlaps(e)).collect()
}

/// Whether `candidate` collides with any existing slot.
pub fn has_conflict(candidate: &Slot, existing: &[Slot]) -> bool {
    existing.iter().any(|e| candidate.overlaps(e))
}

/// The candidates that collide with at least one existing slot, in input order.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use slot_engine::{detect_conflicts, Slot};
///
/// let day = NaiveDate::from_ymd_opt(2025, 8, 13).unwrap();
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let existing = [Slot::new("class", day, t(9, 0), t(10, 0))];
/// let candidates = [
///     Slot::new("a", day, t(9, 30), t(10, 30)),
///     Slot::new("b", day, t(10, 0), t(11, 0)),
/// ];
/// let hits = detect_conflicts(&candidates, &existing);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].id, "a");
/// ```
pub fn detect_conflicts(candidates: &[Slot], existing: &[Slot]) -> Vec<Slot> {
    candidates
        .iter()
        .filter(|c| has_conflict(c, existing))
        .cloned()
        .collect()
}

/// Like [`detect_conflicts`], also listing which existing slots each
/// candidate hits.
pub fn find_conflicts(candidates: &[Slot], existing: &[Slot]) -> Vec<ConflictInfo> {
    candidates
        .iter()
        .filter_map(|candidate| {
            let hits = conflicts_with(candidate, existing);
            if hits.is_empty() {
                None
            } else {
                Some(ConflictInfo {
                    slot: candidate.clone(),
                    conflicting_existing: hits.into_iter().cloned().collect(),
                })
            }
        })
        .collect()
}

/// Split a batch into `(conflicting, clear)`, each keeping input order.
pub fn split_conflicts(batch: &[Slot], existing: &[Slot]) -> (Vec<Slot>, Vec<Slot>) {
    batch
        .iter()
        .cloned()
        .partition(|slot| has_conflict(slot, existing))
}
