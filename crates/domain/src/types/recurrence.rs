//! Recurrence rules for appointment series

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::{CarebookError, Result};

/// How often a series repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
    /// Concrete rule supplied by the caller
    Custom,
}

crate::impl_domain_status_conversions!(RecurrenceFrequency {
    Daily => "daily",
    Weekly => "weekly",
    BiWeekly => "bi_weekly",
    Monthly => "monthly",
    Custom => "custom",
});

/// When a series stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RecurrenceEnd {
    /// Open ended, expansion relies on a caller-supplied bound
    Never,
    /// Last occurrence may start at or before this instant
    OnDate(DateTime<Utc>),
    /// Total number of occurrences, including the first
    AfterOccurrences(u32),
}

/// An abstract recurrence rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    pub frequency: RecurrenceFrequency,
    /// Multiplier applied to the frequency's base step
    pub interval: u32,
    /// Restricts weekly and bi-weekly series to these weekdays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<Weekday>>,
    pub end: RecurrenceEnd,
}

impl RecurrencePattern {
    pub fn new(frequency: RecurrenceFrequency, interval: u32, end: RecurrenceEnd) -> Self {
        Self { frequency, interval, days_of_week: None, end }
    }

    pub fn with_days_of_week(mut self, days: Vec<Weekday>) -> Self {
        self.days_of_week = Some(days);
        self
    }

    /// Reject rules that could never produce a well-defined sequence
    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(CarebookError::InvalidRecurrence("interval must be at least 1".into()));
        }
        if matches!(&self.days_of_week, Some(days) if days.is_empty()) {
            return Err(CarebookError::InvalidRecurrence(
                "days_of_week must not be empty when provided".into(),
            ));
        }
        Ok(())
    }
}
