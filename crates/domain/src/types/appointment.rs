//! Appointment records as consumed by the scheduling engine

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{AppointmentId, ClientId, ServiceId, StaffId};

/// Lifecycle state of an appointment
///
/// ```text
/// scheduled -> confirmed -> checked_in -> in_progress -> completed
///      \___________\____________\_____________\
///                  cancelled | no_show | rescheduled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    CheckedIn,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

crate::impl_domain_status_conversions!(AppointmentStatus {
    Scheduled => "scheduled",
    Confirmed => "confirmed",
    CheckedIn => "checked_in",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
    NoShow => "no_show",
    Rescheduled => "rescheduled",
});

impl AppointmentStatus {
    /// Whether an appointment in this state occupies the staff member's time.
    ///
    /// Cancelled and no-show appointments free their window. A rescheduled
    /// original does too: its replacement record carries the time.
    pub fn blocks_time(self) -> bool {
        !matches!(self, Self::Cancelled | Self::NoShow | Self::Rescheduled)
    }

    /// No further transitions are possible from a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow | Self::Rescheduled)
    }

    fn progress_rank(self) -> Option<u8> {
        match self {
            Self::Scheduled => Some(0),
            Self::Confirmed => Some(1),
            Self::CheckedIn => Some(2),
            Self::InProgress => Some(3),
            Self::Completed => Some(4),
            Self::Cancelled | Self::NoShow | Self::Rescheduled => None,
        }
    }

    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            Self::Cancelled | Self::NoShow | Self::Rescheduled => true,
            _ => match (self.progress_rank(), next.progress_rank()) {
                (Some(from), Some(to)) => to == from + 1,
                _ => false,
            },
        }
    }
}

/// A booked appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub staff_id: StaffId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
    pub start: DateTime<Utc>,
    pub duration_minutes: i64,
    pub status: AppointmentStatus,
    /// The appointment this record replaces, when created by a reschedule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rescheduled_from: Option<AppointmentId>,
}

impl Appointment {
    /// New `scheduled` appointment with a time-ordered id
    pub fn scheduled(staff_id: StaffId, start: DateTime<Utc>, duration_minutes: i64) -> Self {
        Self {
            id: AppointmentId::now_v7(),
            staff_id,
            client_id: None,
            service_id: None,
            start,
            duration_minutes,
            status: AppointmentStatus::Scheduled,
            rescheduled_from: None,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.duration()
    }

    pub fn blocks_time(&self) -> bool {
        self.status.blocks_time()
    }
}
