//! Schedule calendar - "is this staff member open for this window?"
//!
//! Working hours and breaks are wall-clock values in the staff member's
//! timezone; time-off periods are absolute instants. A candidate window is
//! open only when it fits entirely inside the day's working hours and touches
//! neither a time-off period nor a break.

use carebook_domain::{StaffMember, WorkingHours};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Resolve a local wall-clock time to an instant.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant, times that
/// do not exist (DST spring-forward gap) resolve to `None`.
pub(crate) fn local_to_utc(timezone: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    timezone.from_local_datetime(&local).earliest().map(|at| at.with_timezone(&Utc))
}

/// Pure availability predicate over one staff member's configuration
#[derive(Debug, Clone, Copy)]
pub struct ScheduleCalendar<'a> {
    staff: &'a StaffMember,
}

impl<'a> ScheduleCalendar<'a> {
    pub fn new(staff: &'a StaffMember) -> Self {
        Self { staff }
    }

    pub fn staff(&self) -> &'a StaffMember {
        self.staff
    }

    /// Whether `[start, start + duration)` is bookable as far as the
    /// configured schedule is concerned. Existing bookings are not consulted.
    pub fn is_open(&self, start: DateTime<Utc>, duration: Duration) -> bool {
        if duration <= Duration::zero() {
            return false;
        }

        let schedule = &self.staff.schedule;
        let end = start + duration;
        let local_start = start.with_timezone(&schedule.timezone).naive_local();
        let local_end = end.with_timezone(&schedule.timezone).naive_local();
        let date = local_start.date();
        let weekday = date.weekday();

        // Unconfigured weekday means closed
        let Some((open, close)) = schedule.hours_for(weekday).and_then(WorkingHours::window)
        else {
            return false;
        };

        if local_start < date.and_time(open) || local_end > date.and_time(close) {
            return false;
        }

        if schedule.time_off.iter().any(|period| period.overlaps(start, end)) {
            return false;
        }

        !schedule.breaks_on(weekday).any(|period| {
            let (break_start, break_end) = period.window_on(date);
            local_start < break_end && local_end > break_start
        })
    }

    /// Absolute opening and closing instants for a local date, or `None` when
    /// the day is closed or unconfigured.
    pub fn working_window(&self, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let schedule = &self.staff.schedule;
        let (open, close) = schedule.hours_for(date.weekday()).and_then(WorkingHours::window)?;
        let opens_at = local_to_utc(schedule.timezone, date.and_time(open))?;
        let closes_at = schedule
            .timezone
            .from_local_datetime(&date.and_time(close))
            .latest()
            .map(|at| at.with_timezone(&Utc))?;
        Some((opens_at, closes_at))
    }

    /// Longest configured working window across the week
    pub fn longest_window(&self) -> Duration {
        self.staff.schedule.longest_window()
    }
}
