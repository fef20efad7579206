//! Roster and service fixtures

use carebook_domain::{Service, StaffMember, StaffSchedule};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use uuid::Uuid;

pub const WEEKDAYS: [Weekday; 5] =
    [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri];

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// Monday of the fixture week
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
}

/// UTC instant on a day of May 2024
pub fn may(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, minute, 0).unwrap()
}

pub fn service(name: &str, minutes: i64) -> Service {
    Service { id: Uuid::new_v4(), name: name.to_string(), duration_minutes: minutes }
}

/// Weekday staff member working `open..close` UTC and offering `services`
pub fn staff(name: &str, open: NaiveTime, close: NaiveTime, services: &[&Service]) -> StaffMember {
    services.iter().fold(
        StaffMember::new(Uuid::new_v4(), name, StaffSchedule::weekly(&WEEKDAYS, open, close)),
        |member, service| member.with_service(service.id),
    )
}
