//! In-memory appointment store
//!
//! Suitable for tests, demos and single-process deployments. Data lives only
//! as long as the repository value.

use async_trait::async_trait;
use carebook_core::AppointmentRepository;
use carebook_domain::{
    Appointment, AppointmentId, AppointmentStatus, CarebookError, Result, StaffId,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// `AppointmentRepository` backed by a `parking_lot::RwLock<Vec<_>>`
#[derive(Debug, Default)]
pub struct InMemoryAppointmentRepository {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-loaded with existing appointments
    pub fn with_appointments(appointments: Vec<Appointment>) -> Self {
        Self { appointments: RwLock::new(appointments) }
    }

    /// Copy of every stored appointment, in insertion order
    pub fn snapshot(&self) -> Vec<Appointment> {
        self.appointments.read().clone()
    }

    pub fn len(&self) -> usize {
        self.appointments.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.read().is_empty()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn find_by_staff_in_range(
        &self,
        staff_id: StaffId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let guard = self.appointments.read();
        Ok(guard
            .iter()
            .filter(|item| item.staff_id == staff_id && item.start < end && item.end() > start)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        Ok(self.appointments.read().iter().find(|item| item.id == id).cloned())
    }

    async fn insert(&self, appointment: Appointment) -> Result<()> {
        let mut guard = self.appointments.write();
        if guard.iter().any(|item| item.id == appointment.id) {
            return Err(CarebookError::Repository(format!(
                "appointment {} already exists",
                appointment.id
            )));
        }
        guard.push(appointment);
        Ok(())
    }

    async fn update_status(&self, id: AppointmentId, status: AppointmentStatus) -> Result<()> {
        let mut guard = self.appointments.write();
        let item = guard
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| CarebookError::NotFound(format!("appointment {id}")))?;

        if item.status != status && !item.status.can_transition_to(status) {
            return Err(CarebookError::InvalidInput(format!(
                "cannot move appointment {id} from {} to {status}",
                item.status
            )));
        }
        item.status = status;
        Ok(())
    }

    async fn delete(&self, id: AppointmentId) -> Result<()> {
        let mut guard = self.appointments.write();
        let position = guard
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| CarebookError::NotFound(format!("appointment {id}")))?;
        guard.remove(position);
        Ok(())
    }
}
