//! Per-occurrence availability for recurring series

use carebook_domain::{
    Appointment, CarebookError, RecurrencePattern, Result, ScheduleConflict, SchedulingConfig,
    StaffMember, TimeSlot,
};
use chrono::{DateTime, Duration, Utc};

use super::calendar::ScheduleCalendar;
use super::conflict::ConflictDetector;
use super::recurrence::RecurrenceExpander;

/// Why an occurrence can or cannot be booked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OccurrenceStatus {
    Available,
    /// Closed day, break, time-off, or spills past closing
    OutsideWorkingHours,
    Conflict(ScheduleConflict),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrencePlan {
    /// 1-based position in the series
    pub index: usize,
    pub slot: TimeSlot,
    pub status: OccurrenceStatus,
}

impl OccurrencePlan {
    pub fn is_available(&self) -> bool {
        self.status == OccurrenceStatus::Available
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SeriesPlanner {
    expander: RecurrenceExpander,
    detector: ConflictDetector,
}

impl SeriesPlanner {
    pub fn new(config: &SchedulingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            expander: RecurrenceExpander::new(config),
            detector: ConflictDetector::new(config.buffer_policy),
        })
    }

    /// Configured cap for open-ended series
    pub fn max_occurrences(&self) -> u32 {
        self.expander.max_occurrences()
    }

    /// Occurrence starts, stepped in the staff member's timezone
    pub fn occurrences(
        &self,
        staff: &StaffMember,
        pattern: &RecurrencePattern,
        first_start: DateTime<Utc>,
        max_count: u32,
    ) -> Result<Vec<DateTime<Utc>>> {
        self.expander.in_timezone(staff.schedule.timezone).expand(pattern, first_start, max_count)
    }

    /// Expand `pattern` and check every occurrence independently
    pub fn plan(
        &self,
        staff: &StaffMember,
        pattern: &RecurrencePattern,
        first_start: DateTime<Utc>,
        duration: Duration,
        appointments: &[Appointment],
        max_count: u32,
    ) -> Result<Vec<OccurrencePlan>> {
        let starts = self.occurrences(staff, pattern, first_start, max_count)?;
        self.plan_occurrences(staff, &starts, duration, appointments)
    }

    /// Check already-expanded starts. One unavailable occurrence never
    /// affects the others.
    pub fn plan_occurrences(
        &self,
        staff: &StaffMember,
        starts: &[DateTime<Utc>],
        duration: Duration,
        appointments: &[Appointment],
    ) -> Result<Vec<OccurrencePlan>> {
        if duration <= Duration::zero() {
            return Err(CarebookError::InvalidDuration { minutes: duration.num_minutes() });
        }

        let calendar = ScheduleCalendar::new(staff);
        Ok(starts
            .iter()
            .enumerate()
            .map(|(position, start)| {
                let slot = TimeSlot::new(staff.id, *start, duration);
                let status = if !calendar.is_open(*start, duration) {
                    OccurrenceStatus::OutsideWorkingHours
                } else {
                    match self.detector.conflicts_with(staff, &slot, appointments, None) {
                        Some(conflict) => OccurrenceStatus::Conflict(conflict),
                        None => OccurrenceStatus::Available,
                    }
                };
                OccurrencePlan { index: position + 1, slot, status }
            })
            .collect())
    }
}
