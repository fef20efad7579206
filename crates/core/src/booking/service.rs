//! Booking service - check-then-insert under a per-staff lock

use std::sync::Arc;

use carebook_domain::{
    Appointment, AppointmentId, AppointmentStatus, CarebookError, RecurrencePattern, Result,
    SchedulingConfig, StaffId, StaffMember, TimeSlot,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::ports::AppointmentRepository;
use super::{BookingOutcome, BookingRequest, SeriesOutcome, SeriesPolicy, UnavailableReason};
use crate::scheduling::{ConflictDetector, OccurrenceStatus, ScheduleCalendar, SeriesPlanner};

/// Books appointments without double-booking.
///
/// Slot discovery never takes the lock; each write re-validates against the
/// repository while holding the staff member's mutex.
pub struct BookingService {
    repository: Arc<dyn AppointmentRepository>,
    detector: ConflictDetector,
    planner: SeriesPlanner,
    locks: DashMap<StaffId, Arc<Mutex<()>>>,
}

impl BookingService {
    /// Create a new booking service
    pub fn new(
        repository: Arc<dyn AppointmentRepository>,
        config: &SchedulingConfig,
    ) -> Result<Self> {
        Ok(Self {
            repository,
            detector: ConflictDetector::new(config.buffer_policy),
            planner: SeriesPlanner::new(config)?,
            locks: DashMap::new(),
        })
    }

    /// Book a single window
    pub async fn book(
        &self,
        request: BookingRequest,
        roster: &[StaffMember],
    ) -> Result<BookingOutcome> {
        let duration = request.duration()?;
        let staff = find_staff(roster, request.staff_id)?;
        ensure_fits(staff, &request, duration)?;
        if let Some(reason) = refusal(staff, &request) {
            return Ok(BookingOutcome::Unavailable(reason));
        }
        if !ScheduleCalendar::new(staff).is_open(request.start, duration) {
            return Ok(BookingOutcome::Unavailable(UnavailableReason::OutsideWorkingHours));
        }

        let lock = self.lock_for(staff.id);
        let _guard = lock.lock().await;

        let existing = self.load_window(staff, request.start, request.start + duration).await?;
        let slot = TimeSlot::new(staff.id, request.start, duration);
        if let Some(conflict) = self.detector.conflicts_with(staff, &slot, &existing, None) {
            warn!(
                staff_id = %staff.id,
                start = %request.start,
                conflicting = %conflict.conflicting.id,
                "Booking rejected: window already taken"
            );
            return Ok(BookingOutcome::Conflict(conflict));
        }

        let appointment = request.appointment_at(request.start);
        self.repository.insert(appointment.clone()).await?;
        info!(
            appointment_id = %appointment.id,
            staff_id = %staff.id,
            start = %appointment.start,
            "Appointment booked"
        );

        Ok(BookingOutcome::Confirmed(appointment))
    }

    /// Move an appointment to `new_start`.
    ///
    /// Creates a new `scheduled` record pointing at the original and marks the
    /// original `rescheduled`. The original's own window is ignored when
    /// checking for conflicts. If the original cannot be marked, the
    /// replacement is removed again and the original stays live.
    pub async fn reschedule(
        &self,
        appointment_id: AppointmentId,
        new_start: DateTime<Utc>,
        roster: &[StaffMember],
    ) -> Result<BookingOutcome> {
        let original = self.active_original(appointment_id).await?;
        let staff = find_staff(roster, original.staff_id)?;
        let duration = original.duration();
        if duration <= Duration::zero() {
            return Err(CarebookError::InvalidDuration { minutes: original.duration_minutes });
        }
        if !staff.is_active {
            return Ok(BookingOutcome::Unavailable(UnavailableReason::StaffInactive));
        }
        if !ScheduleCalendar::new(staff).is_open(new_start, duration) {
            return Ok(BookingOutcome::Unavailable(UnavailableReason::OutsideWorkingHours));
        }

        let lock = self.lock_for(staff.id);
        let _guard = lock.lock().await;

        // Another writer may have moved or cancelled it while we waited
        let original = self.active_original(appointment_id).await?;
        let existing = self.load_window(staff, new_start, new_start + duration).await?;
        let slot = TimeSlot::new(staff.id, new_start, duration);
        if let Some(conflict) =
            self.detector.conflicts_with(staff, &slot, &existing, Some(original.id))
        {
            warn!(
                appointment_id = %original.id,
                start = %new_start,
                conflicting = %conflict.conflicting.id,
                "Reschedule rejected: window already taken"
            );
            return Ok(BookingOutcome::Conflict(conflict));
        }

        let replacement = Appointment {
            id: AppointmentId::now_v7(),
            start: new_start,
            status: AppointmentStatus::Scheduled,
            rescheduled_from: Some(original.id),
            ..original.clone()
        };
        self.repository.insert(replacement.clone()).await?;
        if let Err(err) =
            self.repository.update_status(original.id, AppointmentStatus::Rescheduled).await
        {
            error!(
                error = %err,
                appointment_id = %original.id,
                replacement_id = %replacement.id,
                "Failed to mark original appointment as rescheduled"
            );
            self.discard(&[replacement.id]).await;
            return Err(err);
        }

        info!(
            appointment_id = %replacement.id,
            rescheduled_from = %original.id,
            start = %new_start,
            "Appointment rescheduled"
        );
        Ok(BookingOutcome::Confirmed(replacement))
    }

    /// Book a recurring series starting at `request.start`.
    ///
    /// The whole series is planned and written under one lock acquisition. A
    /// failed insert removes the occurrences already written.
    pub async fn book_series(
        &self,
        request: BookingRequest,
        pattern: &RecurrencePattern,
        policy: SeriesPolicy,
        roster: &[StaffMember],
    ) -> Result<SeriesOutcome> {
        let duration = request.duration()?;
        let staff = find_staff(roster, request.staff_id)?;
        ensure_fits(staff, &request, duration)?;
        if let Some(reason) = refusal(staff, &request) {
            return Ok(SeriesOutcome::refused(reason));
        }

        let starts = self.planner.occurrences(
            staff,
            pattern,
            request.start,
            self.planner.max_occurrences(),
        )?;
        let (Some(first), Some(last)) = (starts.first(), starts.last()) else {
            return Ok(SeriesOutcome::default());
        };

        let lock = self.lock_for(staff.id);
        let _guard = lock.lock().await;

        let mut existing = self.load_window(staff, *first, *last + duration).await?;
        let mut plans = self.planner.plan_occurrences(staff, &starts, duration, &existing)?;

        // Occurrences accepted earlier in the series count as existing
        let mut accepted = Vec::new();
        for plan in &mut plans {
            if !plan.is_available() {
                continue;
            }
            if let Some(conflict) = self.detector.conflicts_with(staff, &plan.slot, &existing, None)
            {
                plan.status = OccurrenceStatus::Conflict(conflict);
                continue;
            }
            let appointment = request.appointment_at(plan.slot.start);
            existing.push(appointment.clone());
            accepted.push(appointment);
        }

        if policy == SeriesPolicy::AllOrNothing && accepted.len() != plans.len() {
            warn!(
                staff_id = %staff.id,
                occurrences = plans.len(),
                available = accepted.len(),
                "Series rejected: not every occurrence is available"
            );
            return Ok(SeriesOutcome { booked: Vec::new(), plans, unavailable: None });
        }

        let mut written: Vec<AppointmentId> = Vec::with_capacity(accepted.len());
        for appointment in &accepted {
            if let Err(err) = self.repository.insert(appointment.clone()).await {
                error!(
                    error = %err,
                    staff_id = %staff.id,
                    written = written.len(),
                    "Series insert failed, removing written occurrences"
                );
                self.discard(&written).await;
                return Err(err);
            }
            written.push(appointment.id);
        }
        info!(
            staff_id = %staff.id,
            occurrences = plans.len(),
            booked = accepted.len(),
            "Recurring series booked"
        );

        Ok(SeriesOutcome { booked: accepted, plans, unavailable: None })
    }

    /// Best-effort removal of records from a write that could not complete
    async fn discard(&self, ids: &[AppointmentId]) {
        for id in ids {
            if let Err(err) = self.repository.delete(*id).await {
                error!(error = %err, appointment_id = %id, "Failed to remove appointment");
            }
        }
    }

    fn lock_for(&self, staff_id: StaffId) -> Arc<Mutex<()>> {
        self.locks.entry(staff_id).or_default().clone()
    }

    /// Appointments that could collide with `[start, end)` once buffers apply
    async fn load_window(
        &self,
        staff: &StaffMember,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let buffer = staff.schedule.buffer();
        self.repository.find_by_staff_in_range(staff.id, start - buffer, end + buffer).await
    }

    async fn active_original(&self, appointment_id: AppointmentId) -> Result<Appointment> {
        let original = self
            .repository
            .find_by_id(appointment_id)
            .await?
            .ok_or_else(|| CarebookError::NotFound(format!("appointment {appointment_id}")))?;
        if original.status.is_terminal() {
            return Err(CarebookError::InvalidInput(format!(
                "appointment {appointment_id} is {} and cannot be rescheduled",
                original.status
            )));
        }
        Ok(original)
    }
}

fn find_staff(roster: &[StaffMember], staff_id: StaffId) -> Result<&StaffMember> {
    roster
        .iter()
        .find(|staff| staff.id == staff_id)
        .ok_or_else(|| CarebookError::UnknownStaff(staff_id.to_string()))
}

/// A duration longer than any of the staff member's working days can never
/// be booked
fn ensure_fits(staff: &StaffMember, request: &BookingRequest, duration: Duration) -> Result<()> {
    let longest = staff.schedule.longest_window();
    if longest > Duration::zero() && duration > longest {
        return Err(CarebookError::InvalidDuration { minutes: request.duration_minutes });
    }
    Ok(())
}

fn refusal(staff: &StaffMember, request: &BookingRequest) -> Option<UnavailableReason> {
    if !staff.is_active {
        return Some(UnavailableReason::StaffInactive);
    }
    match request.service_id {
        Some(service_id) if !staff.can_perform(service_id) => {
            Some(UnavailableReason::ServiceNotOffered)
        }
        _ => None,
    }
}
