//! # Carebook Core
//!
//! Pure scheduling logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The availability engine (calendar predicate, conflict detection, slot
//!   generation, roster aggregation, recurrence expansion)
//! - The booking service and its persistence port
//!
//! ## Architecture Principles
//! - Only depends on `carebook-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Slot queries are synchronous computations over caller snapshots

pub mod booking;
pub mod scheduling;

// Re-export specific items to avoid ambiguity
pub use booking::ports::AppointmentRepository;
pub use booking::{
    BookingOutcome, BookingRequest, BookingService, SeriesOutcome, SeriesPolicy,
    UnavailableReason,
};
pub use scheduling::{
    AvailabilityAggregator, ConflictDetector, CustomRecurrence, OccurrencePlan, OccurrenceStatus,
    RecurrenceExpander, ScheduleCalendar, SeriesPlanner, SlotGenerator, SlotQuery,
};
