//! # slot-engine
//!
//! Slot scheduling and conflict resolution for facility bookings.
//!
//! A booking request (room, date range, recurrence, daily time window) is
//! expanded into concrete calendar slots, checked against a room's existing
//! occupancy, and the conflicting slots are resolved interactively before
//! being written as allocations. The inverse direction computes a room's free
//! intervals per day and its weekly occupied minutes for utilization reports.
//!
//! Everything is pure, synchronous computation over caller-supplied data: no
//! I/O, no clock reads, no shared state.
//!
//! ## Modules
//!
//! - [`slot`] — the `(date, start, end)` value type and the overlap predicate
//! - [`recurrence`] — booking request → ordered slots
//! - [`vacancy`] — occupied intervals → free intervals within a working window
//! - [`occupancy`] — occupant records → weekly minutes and utilization
//! - [`conflict`] — candidates × existing → conflicting candidates
//! - [`resolution`] — editing session over conflicting slots
//! - [`records`] — ERP record shapes and their projections
//! - [`weekday`] — weekday labels and sets
//! - [`temporal`] — date/time parsing, arithmetic and the "now" anchor
//! - [`config`] — engine configuration
//! - [`error`] — Error types

pub mod config;
pub mod conflict;
pub mod error;
pub mod occupancy;
pub mod records;
pub mod recurrence;
pub mod resolution;
pub mod slot;
pub mod temporal;
pub mod vacancy;
pub mod weekday;

pub use config::SchedulerConfig;
pub use conflict::{detect_conflicts, find_conflicts, split_conflicts, ConflictInfo};
pub use error::SchedulerError;
pub use occupancy::{weekly_totals, Utilization, WeeklyTotals};
pub use records::{
    allocation_records, maintenance_slots, occupant_slots, AllocationRecord, AllocationTemplate,
    MaintenanceWindow, OccupantRecord,
};
pub use recurrence::{expand, expand_with_limit, BookingRequest, Recurrence};
pub use resolution::{ResolutionGroups, ResolutionSession, SlotAssessment, SlotEdit, Submission};
pub use slot::Slot;
pub use temporal::LocalNow;
pub use vacancy::{
    merge_intervals, vacant_intervals, vacant_intervals_at, weekly_vacancy, DayVacancy,
    TimeInterval, WorkingWindow,
};
pub use weekday::WeekdaySet;
