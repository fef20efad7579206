//! Error types used throughout the scheduling engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Carebook
///
/// Only genuinely invalid input is reported through this type. "Nothing
/// available" is an empty result and a booking conflict is a
/// `BookingOutcome`, neither is an error.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CarebookError {
    #[error("Invalid duration: {minutes} minutes")]
    InvalidDuration { minutes: i64 },

    #[error("Invalid slot granularity: {0} minutes")]
    InvalidGranularity(u32),

    #[error("Invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("Unsupported recurrence: {0}")]
    UnsupportedRecurrence(String),

    #[error("Unknown staff member: {0}")]
    UnknownStaff(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Carebook operations
pub type Result<T> = std::result::Result<T, CarebookError>;
