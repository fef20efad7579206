//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! scheduling engine.

// Slot generation
pub const DEFAULT_SLOT_GRANULARITY_MINUTES: u32 = 15;
pub const MAX_SLOT_GRANULARITY_MINUTES: u32 = 24 * 60;

// Recurrence expansion safety bound for open-ended series (one year of weeklies)
pub const DEFAULT_MAX_RECURRENCE_OCCURRENCES: u32 = 52;

// Forward search for the next available slot
pub const DEFAULT_SEARCH_HORIZON_DAYS: u32 = 30;

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
