//! Candidate windows and conflict details

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Appointment, StaffId};

/// A candidate or booked window of the requested service duration.
///
/// The end is always derived from `start + duration_minutes` and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Staff member holding this opening
    pub staff_id: StaffId,
    pub start: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl TimeSlot {
    pub fn new(staff_id: StaffId, start: DateTime<Utc>, duration: Duration) -> Self {
        Self { staff_id, start, duration_minutes: duration.num_minutes() }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.duration()
    }

    /// Half-open overlap test: touching windows do not overlap
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end() > start
    }
}

/// A requested window that collides with an existing booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    pub staff_id: StaffId,
    pub requested: TimeSlot,
    /// The pre-existing appointment that blocks the request
    pub conflicting: Appointment,
}
