//! Staff roster types
//!
//! A staff member's availability is configured as a weekly table of working
//! hours, recurring breaks, absolute time-off periods and a buffer. All
//! time-of-day values are wall-clock times in the schedule's timezone.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::{ServiceId, StaffId};

/// Opening hours for one weekday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub weekday: Weekday,
    pub is_open: bool,
    /// Ignored when `is_open` is false
    pub start: NaiveTime,
    /// Ignored when `is_open` is false
    pub end: NaiveTime,
}

impl WorkingHours {
    /// An open day running from `start` to `end`
    pub fn open(weekday: Weekday, start: NaiveTime, end: NaiveTime) -> Self {
        Self { weekday, is_open: true, start, end }
    }

    /// A day explicitly marked closed
    pub fn closed(weekday: Weekday) -> Self {
        Self { weekday, is_open: false, start: NaiveTime::MIN, end: NaiveTime::MIN }
    }

    /// The usable `[start, end]` window, or `None` when closed.
    ///
    /// An entry whose end is not after its start is treated as closed.
    pub fn window(&self) -> Option<(NaiveTime, NaiveTime)> {
        (self.is_open && self.end > self.start).then_some((self.start, self.end))
    }

    /// Length of the open window (zero when closed)
    pub fn length(&self) -> Duration {
        self.window().map_or_else(Duration::zero, |(start, end)| end - start)
    }
}

/// A recurring daily exclusion window, e.g. lunch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakPeriod {
    pub weekdays: Vec<Weekday>,
    pub start: NaiveTime,
    pub duration_minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl BreakPeriod {
    pub fn applies_to(&self, weekday: Weekday) -> bool {
        self.weekdays.contains(&weekday)
    }

    /// Local wall-clock window of this break on `date`.
    ///
    /// A break running past midnight ends on the following date.
    pub fn window_on(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let start = date.and_time(self.start);
        (start, start + Duration::minutes(self.duration_minutes.max(0)))
    }
}

/// Category of an absence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOffReason {
    Vacation,
    SickLeave,
    Training,
    Personal,
    Other,
}

crate::impl_domain_status_conversions!(TimeOffReason {
    Vacation => "vacation",
    SickLeave => "sick_leave",
    Training => "training",
    Personal => "personal",
    Other => "other",
});

/// An absolute absence that overrides working hours for its span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reason: TimeOffReason,
}

impl TimeOffPeriod {
    /// Half-open overlap test against `[start, end)`
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

fn default_timezone() -> Tz {
    Tz::UTC
}

/// Weekly availability configuration of a staff member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffSchedule {
    /// Timezone the working hours and breaks are expressed in
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// At most one entry per weekday. A missing weekday counts as closed.
    pub working_hours: Vec<WorkingHours>,
    #[serde(default)]
    pub breaks: Vec<BreakPeriod>,
    #[serde(default)]
    pub time_off: Vec<TimeOffPeriod>,
    /// Idle time reserved around existing bookings
    #[serde(default)]
    pub buffer_minutes: i64,
}

impl Default for StaffSchedule {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            working_hours: Vec::new(),
            breaks: Vec::new(),
            time_off: Vec::new(),
            buffer_minutes: 0,
        }
    }
}

impl StaffSchedule {
    /// Same hours on every listed weekday
    pub fn weekly(weekdays: &[Weekday], start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            working_hours: weekdays.iter().map(|day| WorkingHours::open(*day, start, end)).collect(),
            ..Self::default()
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_break(mut self, period: BreakPeriod) -> Self {
        self.breaks.push(period);
        self
    }

    pub fn with_time_off(mut self, period: TimeOffPeriod) -> Self {
        self.time_off.push(period);
        self
    }

    pub fn with_buffer_minutes(mut self, minutes: i64) -> Self {
        self.buffer_minutes = minutes;
        self
    }

    /// Working-hours entry for a weekday, if one is configured
    pub fn hours_for(&self, weekday: Weekday) -> Option<&WorkingHours> {
        self.working_hours.iter().find(|hours| hours.weekday == weekday)
    }

    /// Breaks that apply on a weekday, in configuration order
    pub fn breaks_on(&self, weekday: Weekday) -> impl Iterator<Item = &BreakPeriod> {
        self.breaks.iter().filter(move |period| period.applies_to(weekday))
    }

    /// Longest open window across the week
    pub fn longest_window(&self) -> Duration {
        self.working_hours.iter().map(WorkingHours::length).max().unwrap_or_else(Duration::zero)
    }

    /// Buffer as a `Duration`, negative values clamp to zero
    pub fn buffer(&self) -> Duration {
        Duration::minutes(self.buffer_minutes.max(0))
    }
}

/// A worker who can be booked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub name: String,
    pub is_active: bool,
    /// Services this staff member is qualified to perform
    #[serde(default)]
    pub service_ids: Vec<ServiceId>,
    pub schedule: StaffSchedule,
}

impl StaffMember {
    /// Active staff member with no services assigned yet
    pub fn new(id: StaffId, name: impl Into<String>, schedule: StaffSchedule) -> Self {
        Self { id, name: name.into(), is_active: true, service_ids: Vec::new(), schedule }
    }

    pub fn with_service(mut self, service_id: ServiceId) -> Self {
        self.service_ids.push(service_id);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn can_perform(&self, service_id: ServiceId) -> bool {
        self.service_ids.contains(&service_id)
    }
}

/// A bookable service offered by the practice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub duration_minutes: i64,
}

impl Service {
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }
}
