//! Appointment booking
//!
//! The only part of the engine that performs I/O. Every write goes through
//! a per-staff critical section wrapping {load + conflict check, insert}.

pub mod ports;
pub mod service;

use carebook_domain::{
    Appointment, CarebookError, ClientId, Result, ScheduleConflict, Service, ServiceId, StaffId,
};
use chrono::{DateTime, Duration, Utc};

use crate::scheduling::OccurrencePlan;

pub use service::BookingService;

/// A request to book one window with one staff member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub staff_id: StaffId,
    pub client_id: Option<ClientId>,
    pub service_id: Option<ServiceId>,
    pub start: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl BookingRequest {
    pub fn new(staff_id: StaffId, start: DateTime<Utc>, duration_minutes: i64) -> Self {
        Self { staff_id, client_id: None, service_id: None, start, duration_minutes }
    }

    /// Request for a service, taking its id and duration
    pub fn for_service(staff_id: StaffId, service: &Service, start: DateTime<Utc>) -> Self {
        Self {
            service_id: Some(service.id),
            ..Self::new(staff_id, start, service.duration_minutes)
        }
    }

    pub fn with_client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub(crate) fn duration(&self) -> Result<Duration> {
        if self.duration_minutes <= 0 {
            return Err(CarebookError::InvalidDuration { minutes: self.duration_minutes });
        }
        Ok(Duration::minutes(self.duration_minutes))
    }

    /// New `scheduled` record for this request at `start`
    pub(crate) fn appointment_at(&self, start: DateTime<Utc>) -> Appointment {
        Appointment {
            client_id: self.client_id,
            service_id: self.service_id,
            ..Appointment::scheduled(self.staff_id, start, self.duration_minutes)
        }
    }
}

/// Why a request was refused before any conflict check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// Closed day, break, time-off, or spills past closing
    OutsideWorkingHours,
    StaffInactive,
    ServiceNotOffered,
}

/// Result of a single booking attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Confirmed(Appointment),
    /// The window was taken, possibly after it was displayed as free
    Conflict(ScheduleConflict),
    Unavailable(UnavailableReason),
}

impl BookingOutcome {
    pub fn appointment(&self) -> Option<&Appointment> {
        match self {
            Self::Confirmed(appointment) => Some(appointment),
            _ => None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }
}

/// How a series with unavailable occurrences is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeriesPolicy {
    /// Book every available occurrence and report the rest
    #[default]
    Partial,
    /// Book nothing unless every occurrence is available
    AllOrNothing,
}

/// Result of a series booking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesOutcome {
    /// Appointments actually inserted, in series order
    pub booked: Vec<Appointment>,
    /// Status of every expanded occurrence
    pub plans: Vec<OccurrencePlan>,
    /// Set when the whole series was refused up front
    pub unavailable: Option<UnavailableReason>,
}

impl SeriesOutcome {
    fn refused(reason: UnavailableReason) -> Self {
        Self { unavailable: Some(reason), ..Self::default() }
    }
}
