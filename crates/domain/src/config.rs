//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_RECURRENCE_OCCURRENCES, DEFAULT_SEARCH_HORIZON_DAYS,
    DEFAULT_SLOT_GRANULARITY_MINUTES, MAX_SLOT_GRANULARITY_MINUTES,
};
use crate::{CarebookError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validate every section of the configuration
    pub fn validate(&self) -> Result<()> {
        self.scheduling.validate()
    }
}

/// Which sides of an existing appointment are widened by the staff buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferPolicy {
    /// Buffer is reserved both before and after each booking
    #[default]
    Symmetric,
    /// Buffer is reserved only before each booking (preparation time)
    BeforeOnly,
    /// Buffer is reserved only after each booking (clean-up time)
    AfterOnly,
}

crate::impl_domain_status_conversions!(BufferPolicy {
    Symmetric => "symmetric",
    BeforeOnly => "before_only",
    AfterOnly => "after_only",
});

/// Slot search and booking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Step between candidate slot starts (default: 15 minutes)
    pub slot_granularity_minutes: u32,

    /// How staff buffers widen existing appointments (default: symmetric)
    pub buffer_policy: BufferPolicy,

    /// Cap on expanded occurrences for open-ended series (default: 52)
    pub max_recurrence_occurrences: u32,

    /// Days searched forward by `next_available` (default: 30)
    pub search_horizon_days: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            slot_granularity_minutes: DEFAULT_SLOT_GRANULARITY_MINUTES,
            buffer_policy: BufferPolicy::default(),
            max_recurrence_occurrences: DEFAULT_MAX_RECURRENCE_OCCURRENCES,
            search_horizon_days: DEFAULT_SEARCH_HORIZON_DAYS,
        }
    }
}

impl SchedulingConfig {
    /// Reject values that would make slot generation meaningless
    pub fn validate(&self) -> Result<()> {
        if self.slot_granularity_minutes == 0
            || self.slot_granularity_minutes > MAX_SLOT_GRANULARITY_MINUTES
        {
            return Err(CarebookError::InvalidGranularity(self.slot_granularity_minutes));
        }
        if self.search_horizon_days == 0 {
            return Err(CarebookError::Config("search_horizon_days must be at least 1".into()));
        }
        if self.max_recurrence_occurrences == 0 {
            return Err(CarebookError::Config(
                "max_recurrence_occurrences must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `carebook_core=debug`
    pub level: String,
    /// Emit JSON lines instead of the human-readable format
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), json: false }
    }
}
