//! Error types for slot-engine operations.
//!
//! The scheduling algorithms themselves are total: they degrade to empty or
//! partial results. Errors only surface where raw text is parsed or a
//! session is asked about a slot it does not hold or cannot address.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid weekday: {0}")]
    InvalidWeekday(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    #[error("Duplicate slot id: {0}")]
    DuplicateSlot(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
