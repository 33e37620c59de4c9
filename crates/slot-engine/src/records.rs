//! Record shapes exchanged with the campus ERP, and their projections.
//!
//! Inbound records (room occupancy, maintenance windows) arrive as loosely
//! typed JSON: ids may be numbers or strings, times may be bare `HH:MM` or
//! embedded in ISO datetimes, fields may be missing. They are kept as raw
//! text here and projected into [`Slot`]s on demand; a record that does not
//! project cleanly is skipped by the caller rather than failing a batch.
//!
//! Outbound, every resolved slot becomes one [`AllocationRecord`] for the
//! allocation-write API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::SchedulerError;
use crate::slot::Slot;
use crate::temporal;

// ── Occupancy ───────────────────────────────────────────────────────────────

/// One entry of a room-info response's `occupants` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub occupant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub occupant_name: Option<String>,
    #[serde(default)]
    pub scheduled_date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub faculty_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subroom_id: Option<String>,
    #[serde(default)]
    pub is_editable: Option<bool>,
}

impl OccupantRecord {
    /// Project into a slot for conflict detection or vacancy.
    ///
    /// # Errors
    ///
    /// Returns the first date or time field that fails to parse.
    pub fn to_slot(&self) -> Result<Slot, SchedulerError> {
        Ok(Slot::new(
            self.occupant_id.clone().unwrap_or_default(),
            temporal::parse_date(&self.scheduled_date)?,
            temporal::parse_time(&self.start_time)?,
            temporal::parse_time(&self.end_time)?,
        ))
    }
}

/// Project every occupant that parses; the rest are logged and dropped.
pub fn occupant_slots(occupants: &[OccupantRecord]) -> Vec<Slot> {
    occupants
        .iter()
        .filter_map(|record| match record.to_slot() {
            Ok(slot) => Some(slot),
            Err(err) => {
                tracing::debug!(
                    occupant = record.occupant_id.as_deref().unwrap_or("?"),
                    error = %err,
                    "skipping unparseable occupant record"
                );
                None
            }
        })
        .collect()
}

// ── Maintenance ─────────────────────────────────────────────────────────────

/// A maintenance window, with the field names the maintenance API uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceWindow {
    #[serde(rename = "buildingId", default, deserialize_with = "lenient_string")]
    pub building_id: Option<String>,
    #[serde(rename = "roomid", default, deserialize_with = "lenient_string")]
    pub room_id: Option<String>,
    #[serde(rename = "maintanceDate", default)]
    pub date: String,
    #[serde(rename = "startTime", default)]
    pub start_time: String,
    #[serde(rename = "endTime", default)]
    pub end_time: String,
    #[serde(rename = "isMainteneceActive", default)]
    pub active: bool,
}

impl MaintenanceWindow {
    /// Project into a slot; the clock time is read out of the ISO timestamps.
    ///
    /// # Errors
    ///
    /// Returns the first date or time field that fails to parse.
    pub fn to_slot(&self) -> Result<Slot, SchedulerError> {
        let id = format!(
            "maintenance-{}-{}",
            self.room_id.as_deref().unwrap_or("?"),
            self.date.get(..10).unwrap_or(self.date.as_str())
        );
        Ok(Slot::new(
            id,
            temporal::parse_date(&self.date)?,
            temporal::parse_time(&self.start_time)?,
            temporal::parse_time(&self.end_time)?,
        ))
    }
}

/// Slots for the active maintenance windows that project cleanly.
pub fn maintenance_slots(windows: &[MaintenanceWindow]) -> Vec<Slot> {
    windows
        .iter()
        .filter(|w| w.active)
        .filter_map(|w| match w.to_slot() {
            Ok(slot) => Some(slot),
            Err(err) => {
                tracing::debug!(
                    room = w.room_id.as_deref().unwrap_or("?"),
                    error = %err,
                    "skipping unparseable maintenance window"
                );
                None
            }
        })
        .collect()
}

// ── Allocation write ────────────────────────────────────────────────────────

/// Booking details shared by every allocation written for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationTemplate {
    #[serde(rename = "allocatedRoomID")]
    pub room_id: String,
    pub building_id: String,
    pub academic_session: String,
    pub academic_year: String,
    pub allocated_to: String,
    pub purpose: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub key_assigned: bool,
}

/// One record for the allocation-write API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRecord {
    pub allocation_date: String,
    /// `HH:MM:SS`
    pub start_time: String,
    /// `HH:MM:SS`
    pub end_time: String,
    #[serde(rename = "allocatedRoomID")]
    pub allocated_room_id: String,
    pub building_id: String,
    pub academic_session: String,
    pub academic_year: String,
    pub allocated_to: String,
    pub purpose: String,
    pub remarks: String,
    pub key_assigned: bool,
    pub is_allocation_active: bool,
}

/// One active allocation record per resolved slot, in slot order.
pub fn allocation_records(
    resolved: &[Slot],
    template: &AllocationTemplate,
) -> Vec<AllocationRecord> {
    resolved
        .iter()
        .map(|slot| AllocationRecord {
            allocation_date: slot.date.format("%Y-%m-%d").to_string(),
            start_time: temporal::format_hhmmss(slot.start),
            end_time: temporal::format_hhmmss(slot.end),
            allocated_room_id: template.room_id.clone(),
            building_id: template.building_id.clone(),
            academic_session: template.academic_session.clone(),
            academic_year: template.academic_year.clone(),
            allocated_to: template.allocated_to.clone(),
            purpose: template.purpose.clone(),
            remarks: template.remarks.clone(),
            key_assigned: template.key_assigned,
            is_allocation_active: true,
        })
        .collect()
}

// ── Serde helpers ───────────────────────────────────────────────────────────

/// Accept a string, a number, or null for identifier-like fields.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    })
}
