//! Booking conflict detection
//!
//! Two windows conflict when `a.start < b.end && a.end > b.start`, so
//! back-to-back appointments never collide. Existing appointments are
//! widened by the staff member's buffer before the test.

use carebook_domain::{
    Appointment, AppointmentId, BufferPolicy, ScheduleConflict, StaffMember, TimeSlot,
};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictDetector {
    policy: BufferPolicy,
}

impl ConflictDetector {
    pub fn new(policy: BufferPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> BufferPolicy {
        self.policy
    }

    /// Window an existing appointment occupies once the buffer is applied
    pub fn occupied_window(
        &self,
        appointment: &Appointment,
        buffer: Duration,
    ) -> (DateTime<Utc>, DateTime<Utc>) {
        let (before, after) = match self.policy {
            BufferPolicy::Symmetric => (buffer, buffer),
            BufferPolicy::BeforeOnly => (buffer, Duration::zero()),
            BufferPolicy::AfterOnly => (Duration::zero(), buffer),
        };
        (appointment.start - before, appointment.end() + after)
    }

    /// First appointment (in input order) that collides with `window`.
    ///
    /// Appointments for other staff members, those that no longer block time
    /// and the `excluding` id are ignored.
    pub fn conflicts_with(
        &self,
        staff: &StaffMember,
        window: &TimeSlot,
        appointments: &[Appointment],
        excluding: Option<AppointmentId>,
    ) -> Option<ScheduleConflict> {
        self.blocking(staff, window, appointments, excluding)
            .next()
            .map(|appointment| self.conflict(staff, window, appointment))
    }

    /// Every appointment that collides with `window`, in input order
    pub fn all_conflicts(
        &self,
        staff: &StaffMember,
        window: &TimeSlot,
        appointments: &[Appointment],
        excluding: Option<AppointmentId>,
    ) -> Vec<ScheduleConflict> {
        self.blocking(staff, window, appointments, excluding)
            .map(|appointment| self.conflict(staff, window, appointment))
            .collect()
    }

    fn blocking<'a>(
        &'a self,
        staff: &'a StaffMember,
        window: &'a TimeSlot,
        appointments: &'a [Appointment],
        excluding: Option<AppointmentId>,
    ) -> impl Iterator<Item = &'a Appointment> + 'a {
        let buffer = staff.schedule.buffer();
        appointments
            .iter()
            .filter(move |appointment| appointment.staff_id == staff.id)
            .filter(|appointment| appointment.blocks_time())
            .filter(move |appointment| Some(appointment.id) != excluding)
            .filter(move |appointment| {
                let (start, end) = self.occupied_window(appointment, buffer);
                window.overlaps(start, end)
            })
    }

    fn conflict(
        &self,
        staff: &StaffMember,
        window: &TimeSlot,
        appointment: &Appointment,
    ) -> ScheduleConflict {
        ScheduleConflict {
            staff_id: staff.id,
            requested: *window,
            conflicting: appointment.clone(),
        }
    }
}
