//! Staff availability engine
//!
//! Control flow for a slot query:
//! `AvailabilityAggregator` -> `SlotGenerator` (per staff member) ->
//! `ScheduleCalendar` + `ConflictDetector` (per candidate).
//!
//! Recurring series are expanded once by `RecurrenceExpander` and each
//! occurrence is checked independently by `SeriesPlanner`.

pub mod availability;
pub mod calendar;
pub mod conflict;
pub mod recurrence;
pub mod series;
pub mod slots;

pub use availability::{AvailabilityAggregator, SlotQuery};
pub use calendar::ScheduleCalendar;
pub use conflict::ConflictDetector;
pub use recurrence::{CustomRecurrence, RecurrenceExpander};
pub use series::{OccurrencePlan, OccurrenceStatus, SeriesPlanner};
pub use slots::SlotGenerator;
