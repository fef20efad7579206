//! Per-staff slot generation for a single local date

use carebook_domain::{
    Appointment, AppointmentId, CarebookError, Result, SchedulingConfig, StaffMember, TimeSlot,
    WorkingHours,
};
use chrono::{Datelike, Duration, NaiveDate};

use super::calendar::{local_to_utc, ScheduleCalendar};
use super::conflict::ConflictDetector;

/// Walks a staff member's working day in granularity steps and keeps every
/// candidate that is both open and conflict-free.
#[derive(Debug, Clone, Copy)]
pub struct SlotGenerator {
    granularity: Duration,
    detector: ConflictDetector,
}

impl SlotGenerator {
    pub fn new(config: &SchedulingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            granularity: Duration::minutes(i64::from(config.slot_granularity_minutes)),
            detector: ConflictDetector::new(config.buffer_policy),
        })
    }

    /// Generator with an explicit step, using the default buffer policy
    pub fn with_granularity(minutes: u32) -> Result<Self> {
        Self::new(&SchedulingConfig { slot_granularity_minutes: minutes, ..Default::default() })
            .map_err(|_| CarebookError::InvalidGranularity(minutes))
    }

    pub fn granularity(&self) -> Duration {
        self.granularity
    }

    pub fn detector(&self) -> &ConflictDetector {
        &self.detector
    }

    /// Ascending, conflict-free slots of `duration` on the staff member's
    /// local `date`. Closed or unconfigured days yield an empty list.
    pub fn generate(
        &self,
        staff: &StaffMember,
        date: NaiveDate,
        duration: Duration,
        appointments: &[Appointment],
    ) -> Vec<TimeSlot> {
        self.generate_excluding(staff, date, duration, appointments, None)
    }

    /// Same as [`generate`](Self::generate) but treats `excluding` as free,
    /// which is what a reschedule needs.
    pub fn generate_excluding(
        &self,
        staff: &StaffMember,
        date: NaiveDate,
        duration: Duration,
        appointments: &[Appointment],
        excluding: Option<AppointmentId>,
    ) -> Vec<TimeSlot> {
        if duration <= Duration::zero() {
            return Vec::new();
        }

        let schedule = &staff.schedule;
        let Some((open, close)) = schedule.hours_for(date.weekday()).and_then(WorkingHours::window)
        else {
            return Vec::new();
        };

        let calendar = ScheduleCalendar::new(staff);
        let relevant = self.scope(staff, &calendar, date, appointments);

        let close = date.and_time(close);
        let mut cursor = date.and_time(open);
        let mut slots = Vec::new();

        while cursor + duration <= close {
            // Wall-clock times inside a DST gap have no instant
            if let Some(start) = local_to_utc(schedule.timezone, cursor) {
                let candidate = TimeSlot::new(staff.id, start, duration);
                if calendar.is_open(start, duration)
                    && self.detector.conflicts_with(staff, &candidate, &relevant, excluding).is_none()
                {
                    slots.push(candidate);
                }
            }
            cursor += self.granularity;
        }

        slots
    }

    /// Appointments for this staff member that can touch the working day
    fn scope(
        &self,
        staff: &StaffMember,
        calendar: &ScheduleCalendar<'_>,
        date: NaiveDate,
        appointments: &[Appointment],
    ) -> Vec<Appointment> {
        let window = calendar.working_window(date);
        let buffer = staff.schedule.buffer();

        appointments
            .iter()
            .filter(|appointment| appointment.staff_id == staff.id && appointment.blocks_time())
            .filter(|appointment| match window {
                Some((opens, closes)) => {
                    let (start, end) = self.detector.occupied_window(appointment, buffer);
                    start < closes && end > opens
                }
                None => true,
            })
            .cloned()
            .collect()
    }
}
