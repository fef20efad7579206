//! Domain types and models
//!
//! Everything here is a snapshot supplied by (or returned to) collaborators.
//! The engine never mutates these records in place.

pub mod appointment;
pub mod recurrence;
pub mod slot;
pub mod staff;

use uuid::Uuid;

pub use appointment::{Appointment, AppointmentStatus};
pub use recurrence::{RecurrenceEnd, RecurrenceFrequency, RecurrencePattern};
pub use slot::{ScheduleConflict, TimeSlot};
pub use staff::{
    BreakPeriod, Service, StaffMember, StaffSchedule, TimeOffPeriod, TimeOffReason, WorkingHours,
};

/// Identifier of a staff member (worker)
pub type StaffId = Uuid;

/// Identifier of an appointment record
pub type AppointmentId = Uuid;

/// Identifier of a bookable service
pub type ServiceId = Uuid;

/// Identifier of a client
pub type ClientId = Uuid;
