//! Port interfaces for booking persistence
//!
//! The booking service reads and writes appointments only through these
//! traits. Adapters live in the infra crate.

use async_trait::async_trait;
use carebook_domain::{Appointment, AppointmentId, AppointmentStatus, Result, StaffId};
use chrono::{DateTime, Utc};

/// Trait for storing and querying appointments
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Appointments for a staff member whose window intersects
    /// `[start, end)`, in any status
    async fn find_by_staff_in_range(
        &self,
        staff_id: StaffId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;

    /// Look up a single appointment
    async fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>>;

    /// Persist a new appointment
    async fn insert(&self, appointment: Appointment) -> Result<()>;

    /// Change the status of an existing appointment
    async fn update_status(&self, id: AppointmentId, status: AppointmentStatus) -> Result<()>;

    /// Remove an appointment written by a booking that could not complete
    async fn delete(&self, id: AppointmentId) -> Result<()>;
}
