//! Engine configuration.
//!
//! Everything here has a default, so an empty JSON object is a valid
//! configuration:
//!
//! ```json
//! {
//!   "timezone": "Asia/Kolkata",
//!   "workWindow": { "start": "09:00", "end": "18:00" },
//!   "maxExpansionDays": 731
//! }
//! ```

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;
use crate::recurrence::DEFAULT_MAX_EXPANSION_DAYS;
use crate::temporal::{self, LocalNow};
use crate::vacancy::WorkingWindow;

pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// IANA timezone in which dates and times of day are interpreted.
    pub timezone: String,
    /// Daily bookable window for vacancy and utilization.
    pub work_window: WorkingWindow,
    /// Longest span, in days, a single booking request may expand over.
    pub max_expansion_days: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            work_window: WorkingWindow::default(),
            max_expansion_days: DEFAULT_MAX_EXPANSION_DAYS,
        }
    }
}

impl SchedulerConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] for malformed JSON or any
    /// failure of [`SchedulerConfig::validate`].
    pub fn from_json_str(s: &str) -> Result<Self, SchedulerError> {
        let config: SchedulerConfig =
            serde_json::from_str(s).map_err(|e| SchedulerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the timezone name, that the window is non-empty, and that
    /// expansion is allowed at least one day.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        self.tz()?;
        if self.work_window.end <= self.work_window.start {
            return Err(SchedulerError::InvalidConfig(format!(
                "work window {}-{} is empty",
                temporal::format_hhmm(self.work_window.start),
                temporal::format_hhmm(self.work_window.end)
            )));
        }
        if self.max_expansion_days == 0 {
            return Err(SchedulerError::InvalidConfig(
                "maxExpansionDays must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz, SchedulerError> {
        temporal::parse_timezone(&self.timezone)
    }

    /// The configured timezone's view of `anchor`.
    pub fn local_now(&self, anchor: DateTime<Utc>) -> Result<LocalNow, SchedulerError> {
        Ok(LocalNow::from_utc(anchor, self.tz()?))
    }
}
