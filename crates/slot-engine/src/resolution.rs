//! Interactive resolution of conflicting slots.
//!
//! A [`ResolutionSession`] is a small reducer. It owns an editable copy of
//! every conflicting slot, the unchanged set of existing bookings, and the
//! caller's "now". The UI dispatches [`SlotEdit`]s; each edit touches one
//! field of one slot and re-assesses that slot on two independent axes:
//!
//! - **temporal validity**: the date is not before today, a slot today does
//!   not start before the current time, and the end is after the start;
//! - **overlap**: the slot still collides with an existing booking.
//!
//! A slot is resolved when it is temporally valid and overlaps nothing. The
//! [`ResolutionGroups`] partition is derived from the entries on demand, so
//! it is always consistent with the latest edit.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::conflict::{has_conflict, split_conflicts};
use crate::error::SchedulerError;
use crate::slot::Slot;
use crate::temporal::{self, hhmm, LocalNow};

// ── Edits ───────────────────────────────────────────────────────────────────

/// A single-field change to an editable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum SlotEdit {
    /// Move the slot to another date.
    SetDate(NaiveDate),
    /// Move the slot by a number of days (negative moves earlier).
    ShiftDays(i64),
    /// Change the start time.
    SetStart(#[serde(with = "hhmm")] NaiveTime),
    /// Change the end time.
    SetEnd(#[serde(with = "hhmm")] NaiveTime),
}

/// Apply an edit to a copy of `slot`.
///
/// A day shift that would overflow the calendar leaves the date unchanged.
pub fn apply_edit(slot: &Slot, edit: SlotEdit) -> Slot {
    let mut next = slot.clone();
    match edit {
        SlotEdit::SetDate(date) => next.date = date,
        SlotEdit::ShiftDays(days) => {
            next.date = temporal::add_days(slot.date, days).unwrap_or(slot.date);
        }
        SlotEdit::SetStart(start) => next.start = start,
        SlotEdit::SetEnd(end) => next.end = end,
    }
    next
}

// ── Assessment ──────────────────────────────────────────────────────────────

/// The two validity axes of an editable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAssessment {
    pub temporally_valid: bool,
    pub overlapping: bool,
}

impl SlotAssessment {
    pub fn is_resolved(&self) -> bool {
        self.temporally_valid && !self.overlapping
    }
}

/// Whether `slot` can still be booked at `now`.
pub fn is_temporally_valid(slot: &Slot, now: &LocalNow) -> bool {
    if slot.date < now.today {
        return false;
    }
    if slot.date == now.today && slot.start < now.time {
        return false;
    }
    slot.end > slot.start
}

/// Assess `slot` against the existing bookings at `now`.
pub fn assess(slot: &Slot, existing: &[Slot], now: &LocalNow) -> SlotAssessment {
    SlotAssessment {
        temporally_valid: is_temporally_valid(slot, now),
        overlapping: has_conflict(slot, existing),
    }
}

// ── Session ─────────────────────────────────────────────────────────────────

/// One conflicting slot under edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableSlot {
    /// The slot as it was when the session was loaded.
    pub original: Slot,
    /// The slot with every edit so far applied.
    pub current: Slot,
    pub assessment: SlotAssessment,
}

impl EditableSlot {
    pub fn is_resolved(&self) -> bool {
        self.assessment.is_resolved()
    }
}

/// The batch split by resolution state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionGroups {
    /// Edited slots that now pass both checks, plus every slot that never
    /// conflicted; ascending by date and start time.
    pub resolved: Vec<Slot>,
    /// Edited slots still failing either check, in load order.
    pub unresolved: Vec<Slot>,
}

/// What the caller may do with the batch right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Submission {
    /// Hand these slots to the allocation-write API.
    Ready { slots: Vec<Slot> },
    /// Some slots are unresolved; the operator must confirm discarding them
    /// (resubmit with `discard_unresolved = true`) or abort.
    NeedsConfirmation {
        resolved: Vec<Slot>,
        unresolved: Vec<Slot>,
    },
}

/// Editing state for one resolution view. Not shared between views.
#[derive(Debug, Clone)]
pub struct ResolutionSession {
    entries: Vec<EditableSlot>,
    clear: Vec<Slot>,
    existing: Vec<Slot>,
    now: LocalNow,
}

impl ResolutionSession {
    /// Split a freshly expanded batch against the existing bookings and open
    /// a session over the conflicting part.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::DuplicateSlot`] if two batch slots share an
    /// id, since edits are addressed by id.
    pub fn load(
        batch: &[Slot],
        existing: Vec<Slot>,
        now: LocalNow,
    ) -> Result<Self, SchedulerError> {
        let (conflicting, clear) = split_conflicts(batch, &existing);
        Self::new(conflicting, clear, existing, now)
    }

    /// Open a session over slots already known to conflict. Each starts
    /// flagged as overlapping; `clear` slots pass through untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::DuplicateSlot`] if an id occurs more than
    /// once across `conflicting` and `clear`.
    pub fn new(
        conflicting: Vec<Slot>,
        clear: Vec<Slot>,
        existing: Vec<Slot>,
        now: LocalNow,
    ) -> Result<Self, SchedulerError> {
        let mut seen = HashSet::new();
        if let Some(dup) = conflicting
            .iter()
            .chain(&clear)
            .find(|slot| !seen.insert(slot.id.as_str()))
        {
            return Err(SchedulerError::DuplicateSlot(dup.id.clone()));
        }

        let entries = conflicting
            .into_iter()
            .map(|slot| EditableSlot {
                assessment: SlotAssessment {
                    temporally_valid: is_temporally_valid(&slot, &now),
                    overlapping: true,
                },
                current: slot.clone(),
                original: slot,
            })
            .collect();
        Ok(Self {
            entries,
            clear,
            existing,
            now,
        })
    }

    pub fn entries(&self) -> &[EditableSlot] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&EditableSlot> {
        self.entries.iter().find(|e| e.current.id == id)
    }

    /// Number of slots that conflicted when the session was loaded.
    pub fn conflicting_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of edited slots that are currently resolved.
    pub fn resolved_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_resolved()).count()
    }

    /// True once no edited slot is left unresolved.
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(EditableSlot::is_resolved)
    }

    /// Apply one edit to the slot with id `id` and re-assess it.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::UnknownSlot`] if no editable slot has that id.
    pub fn apply(&mut self, id: &str, edit: SlotEdit) -> Result<&EditableSlot, SchedulerError> {
        let existing = &self.existing;
        let now = &self.now;
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.current.id == id)
            .ok_or_else(|| SchedulerError::UnknownSlot(id.to_string()))?;

        entry.current = apply_edit(&entry.current, edit);
        entry.assessment = assess(&entry.current, existing, now);
        tracing::debug!(
            slot = id,
            ?edit,
            temporally_valid = entry.assessment.temporally_valid,
            overlapping = entry.assessment.overlapping,
            "slot edited"
        );
        Ok(entry)
    }

    /// Move the session's clock and re-check temporal validity of every
    /// edited slot.
    pub fn set_now(&mut self, now: LocalNow) {
        self.now = now;
        for entry in &mut self.entries {
            entry.assessment.temporally_valid = is_temporally_valid(&entry.current, &self.now);
        }
    }

    /// Current partition of the batch.
    pub fn groups(&self) -> ResolutionGroups {
        let mut resolved: Vec<Slot> = self.clear.clone();
        let mut unresolved = Vec::new();
        for entry in &self.entries {
            if entry.is_resolved() {
                resolved.push(entry.current.clone());
            } else {
                unresolved.push(entry.current.clone());
            }
        }
        resolved.sort_by_key(|s| (s.date, s.start));
        ResolutionGroups {
            resolved,
            unresolved,
        }
    }

    /// Decide what can be written.
    ///
    /// With unresolved slots left and no confirmation, the caller gets
    /// [`Submission::NeedsConfirmation`] and nothing should be written.
    pub fn submit(&self, discard_unresolved: bool) -> Submission {
        let ResolutionGroups {
            resolved,
            unresolved,
        } = self.groups();
        if unresolved.is_empty() {
            return Submission::Ready { slots: resolved };
        }
        if discard_unresolved {
            tracing::info!(
                discarded = unresolved.len(),
                kept = resolved.len(),
                "operator confirmed discarding unresolved slots"
            );
            return Submission::Ready { slots: resolved };
        }
        Submission::NeedsConfirmation {
            resolved,
            unresolved,
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
