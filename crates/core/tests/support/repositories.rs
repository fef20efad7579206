//! Mock repository implementations for testing

use std::sync::Arc;

use async_trait::async_trait;
use carebook_core::AppointmentRepository;
use carebook_domain::{
    Appointment, AppointmentId, AppointmentStatus, CarebookError, Result as DomainResult, StaffId,
};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

/// In-memory mock for `AppointmentRepository`.
///
/// Every call yields to the scheduler first so concurrent callers interleave
/// between the read and the write of a booking.
#[derive(Default, Clone)]
pub struct MockAppointmentRepository {
    appointments: Arc<Mutex<Vec<Appointment>>>,
}

impl MockAppointmentRepository {
    pub fn with_appointments(appointments: Vec<Appointment>) -> Self {
        Self { appointments: Arc::new(Mutex::new(appointments)) }
    }

    pub async fn snapshot(&self) -> Vec<Appointment> {
        self.appointments.lock().await.clone()
    }
}

#[async_trait]
impl AppointmentRepository for MockAppointmentRepository {
    async fn find_by_staff_in_range(
        &self,
        staff_id: StaffId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<Appointment>> {
        tokio::task::yield_now().await;
        let guard = self.appointments.lock().await;
        Ok(guard
            .iter()
            .filter(|item| item.staff_id == staff_id && item.start < end && item.end() > start)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: AppointmentId) -> DomainResult<Option<Appointment>> {
        tokio::task::yield_now().await;
        let guard = self.appointments.lock().await;
        Ok(guard.iter().find(|item| item.id == id).cloned())
    }

    async fn insert(&self, appointment: Appointment) -> DomainResult<()> {
        tokio::task::yield_now().await;
        self.appointments.lock().await.push(appointment);
        Ok(())
    }

    async fn update_status(&self, id: AppointmentId, status: AppointmentStatus) -> DomainResult<()> {
        tokio::task::yield_now().await;
        let mut guard = self.appointments.lock().await;
        let item = guard
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| CarebookError::NotFound(format!("appointment {id}")))?;
        item.status = status;
        Ok(())
    }

    async fn delete(&self, id: AppointmentId) -> DomainResult<()> {
        tokio::task::yield_now().await;
        let mut guard = self.appointments.lock().await;
        let before = guard.len();
        guard.retain(|item| item.id != id);
        if guard.len() == before {
            return Err(CarebookError::NotFound(format!("appointment {id}")));
        }
        Ok(())
    }
}
