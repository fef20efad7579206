//! Roster-wide slot search

use std::collections::BTreeMap;

use carebook_domain::{
    Appointment, CarebookError, Result, SchedulingConfig, Service, StaffId, StaffMember, TimeSlot,
};
use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use tracing::debug;

use super::slots::SlotGenerator;

/// What the caller wants to book and when
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotQuery {
    pub service: Service,
    /// Restrict the search to one staff member
    pub staff_id: Option<StaffId>,
    /// Local date, interpreted in each staff member's timezone
    pub date: NaiveDate,
}

impl SlotQuery {
    pub fn any_staff(service: Service, date: NaiveDate) -> Self {
        Self { service, staff_id: None, date }
    }

    pub fn for_staff(service: Service, staff_id: StaffId, date: NaiveDate) -> Self {
        Self { service, staff_id: Some(staff_id), date }
    }

    /// Same query on another date
    pub fn on(&self, date: NaiveDate) -> Self {
        Self { date, ..self.clone() }
    }
}

/// Fans a query out over the roster and merges per-staff results
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityAggregator {
    generator: SlotGenerator,
    horizon_days: u32,
}

impl AvailabilityAggregator {
    pub fn new(config: &SchedulingConfig) -> Result<Self> {
        Ok(Self { generator: SlotGenerator::new(config)?, horizon_days: config.search_horizon_days })
    }

    pub fn generator(&self) -> &SlotGenerator {
        &self.generator
    }

    /// Open slots for the query, one per start time.
    ///
    /// With a requested staff member this is that member's slot list. Without
    /// one, every active and capable member is searched and a start offered
    /// by several members is kept once, attributed to the first of them in
    /// roster order.
    pub fn find_slots(
        &self,
        query: &SlotQuery,
        roster: &[StaffMember],
        appointments: &[Appointment],
    ) -> Result<Vec<TimeSlot>> {
        let eligible = self.eligible(query, roster)?;
        let duration = validate_duration(&query.service, &eligible)?;

        let mut by_start: BTreeMap<DateTime<Utc>, TimeSlot> = BTreeMap::new();
        for staff in &eligible {
            for slot in self.generator.generate(staff, query.date, duration, appointments) {
                by_start.entry(slot.start).or_insert(slot);
            }
        }

        debug!(
            eligible = eligible.len(),
            slots = by_start.len(),
            date = %query.date,
            "Merged roster availability"
        );
        Ok(by_start.into_values().collect())
    }

    /// Every (staff, start) opening without collapsing, ordered by start and
    /// then roster position.
    pub fn find_slots_by_staff(
        &self,
        query: &SlotQuery,
        roster: &[StaffMember],
        appointments: &[Appointment],
    ) -> Result<Vec<TimeSlot>> {
        let eligible = self.eligible(query, roster)?;
        let duration = validate_duration(&query.service, &eligible)?;

        let mut ranked: Vec<(usize, TimeSlot)> = eligible
            .iter()
            .enumerate()
            .flat_map(|(position, staff)| {
                self.generator
                    .generate(staff, query.date, duration, appointments)
                    .into_iter()
                    .map(move |slot| (position, slot))
            })
            .collect();
        ranked.sort_by_key(|(position, slot)| (slot.start, *position));

        Ok(ranked.into_iter().map(|(_, slot)| slot).collect())
    }

    /// [`find_slots`](Self::find_slots) over every date in `from..=to`
    pub fn find_slots_in_range(
        &self,
        query: &SlotQuery,
        from: NaiveDate,
        to: NaiveDate,
        roster: &[StaffMember],
        appointments: &[Appointment],
    ) -> Result<Vec<TimeSlot>> {
        if to < from {
            return Err(CarebookError::InvalidInput(format!(
                "date range ends ({to}) before it starts ({from})"
            )));
        }

        let mut slots = Vec::new();
        for date in from.iter_days().take_while(|date| *date <= to) {
            slots.extend(self.find_slots(&query.on(date), roster, appointments)?);
        }

        // Local dates of different timezones can interleave
        slots.sort_by_key(|slot| slot.start);
        slots.dedup_by_key(|slot| slot.start);
        Ok(slots)
    }

    /// Earliest slot starting at or after `from` within the configured
    /// search horizon.
    pub fn next_available(
        &self,
        query: &SlotQuery,
        from: DateTime<Utc>,
        roster: &[StaffMember],
        appointments: &[Appointment],
    ) -> Result<Option<TimeSlot>> {
        self.next_available_within(query, from, self.horizon_days, roster, appointments)
    }

    /// Earliest slot starting at or after `from` within `horizon_days`.
    /// `query.date` is ignored.
    pub fn next_available_within(
        &self,
        query: &SlotQuery,
        from: DateTime<Utc>,
        horizon_days: u32,
        roster: &[StaffMember],
        appointments: &[Appointment],
    ) -> Result<Option<TimeSlot>> {
        let origin = from.date_naive();
        // Staff west of UTC can still be on the previous local date
        let first = origin.pred_opt().unwrap_or(origin);
        let last = origin.checked_add_days(Days::new(u64::from(horizon_days))).ok_or_else(|| {
            CarebookError::InvalidInput(format!(
                "search horizon of {horizon_days} days from {origin} is out of range"
            ))
        })?;

        let mut best: Option<TimeSlot> = None;
        for date in first.iter_days().take_while(|date| *date <= last) {
            if let Some(found) = best {
                if found.start.date_naive().succ_opt().map_or(true, |next| date > next) {
                    break;
                }
            }

            let earliest = self
                .find_slots(&query.on(date), roster, appointments)?
                .into_iter()
                .find(|slot| slot.start >= from);

            if let Some(slot) = earliest {
                if best.map_or(true, |current| slot.start < current.start) {
                    best = Some(slot);
                }
            }
        }

        debug!(found = best.is_some(), horizon_days, "Searched for next available slot");
        Ok(best)
    }

    fn eligible<'r>(
        &self,
        query: &SlotQuery,
        roster: &'r [StaffMember],
    ) -> Result<Vec<&'r StaffMember>> {
        match query.staff_id {
            Some(staff_id) => roster
                .iter()
                .find(|staff| staff.id == staff_id)
                .map(|staff| vec![staff])
                .ok_or_else(|| CarebookError::UnknownStaff(staff_id.to_string())),
            None => Ok(roster
                .iter()
                .filter(|staff| staff.is_active && staff.can_perform(query.service.id))
                .collect()),
        }
    }
}

/// Reject durations no eligible staff member could ever fit
fn validate_duration(service: &Service, eligible: &[&StaffMember]) -> Result<Duration> {
    let minutes = service.duration_minutes;
    if minutes <= 0 {
        return Err(CarebookError::InvalidDuration { minutes });
    }

    let duration = service.duration();
    let longest = eligible
        .iter()
        .map(|staff| staff.schedule.longest_window())
        .filter(|window| *window > Duration::zero())
        .max();

    match longest {
        Some(longest) if duration > longest => Err(CarebookError::InvalidDuration { minutes }),
        _ => Ok(duration),
    }
}

#[cfg(test)]
mod tests {
    use carebook_domain::StaffSchedule;
    use chrono::{NaiveTime, TimeZone, Weekday};
    use uuid::Uuid;

    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, h, m, 0).unwrap()
    }

    fn service(minutes: i64) -> Service {
        Service { id: Uuid::new_v4(), name: "Consultation".into(), duration_minutes: minutes }
    }

    fn member(name: &str, service: &Service, open: NaiveTime, close: NaiveTime) -> StaffMember {
        StaffMember::new(
            Uuid::new_v4(),
            name,
            StaffSchedule::weekly(&[Weekday::Mon, Weekday::Tue], open, close),
        )
        .with_service(service.id)
    }

    fn aggregator() -> AvailabilityAggregator {
        AvailabilityAggregator::new(&SchedulingConfig::default()).unwrap()
    }

    #[test]
    fn test_duplicate_starts_collapse_to_first_in_roster() {
        let service = service(60);
        let first = member("Alex", &service, time(9, 0), time(12, 0));
        let second = member("Blake", &service, time(10, 0), time(14, 0));
        let roster = vec![first.clone(), second.clone()];

        let slots =
            aggregator().find_slots(&SlotQuery::any_staff(service, monday()), &roster, &[]).unwrap();

        assert!(slots.windows(2).all(|pair| pair[0].start < pair[1].start));
        assert_eq!(slots.first().unwrap().start, at(6, 9, 0));
        assert_eq!(slots.last().unwrap().start, at(6, 13, 0));

        let ten = slots.iter().find(|slot| slot.start == at(6, 10, 0)).unwrap();
        assert_eq!(ten.staff_id, first.id);
        let one_pm = slots.iter().find(|slot| slot.start == at(6, 13, 0)).unwrap();
        assert_eq!(one_pm.staff_id, second.id);
    }

    #[test]
    fn test_by_staff_view_keeps_every_pair() {
        let service = service(60);
        let first = member("Alex", &service, time(9, 0), time(12, 0));
        let second = member("Blake", &service, time(10, 0), time(14, 0));
        let roster = vec![first.clone(), second.clone()];

        let pairs = aggregator()
            .find_slots_by_staff(&SlotQuery::any_staff(service, monday()), &roster, &[])
            .unwrap();

        // 9 starts for Alex (09:00-11:00), 13 for Blake (10:00-13:00)
        assert_eq!(pairs.len(), 9 + 13);
        let at_ten: Vec<_> =
            pairs.iter().filter(|slot| slot.start == at(6, 10, 0)).map(|s| s.staff_id).collect();
        assert_eq!(at_ten, vec![first.id, second.id]);
    }

    #[test]
    fn test_inactive_and_unqualified_staff_are_skipped() {
        let service = service(30);
        let inactive = member("Casey", &service, time(9, 0), time(10, 0)).inactive();
        let unqualified = StaffMember::new(
            Uuid::new_v4(),
            "Drew",
            StaffSchedule::weekly(&[Weekday::Mon], time(9, 0), time(10, 0)),
        );
        let roster = vec![inactive, unqualified];

        let slots =
            aggregator().find_slots(&SlotQuery::any_staff(service, monday()), &roster, &[]).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_requested_staff_is_searched_directly() {
        let service = service(30);
        let inactive = member("Casey", &service, time(9, 0), time(10, 0)).inactive();
        let roster = vec![inactive.clone()];
        let aggregator = aggregator();

        let slots = aggregator
            .find_slots(&SlotQuery::for_staff(service.clone(), inactive.id, monday()), &roster, &[])
            .unwrap();
        assert_eq!(slots.len(), 3);

        let unknown = Uuid::new_v4();
        let err = aggregator
            .find_slots(&SlotQuery::for_staff(service, unknown, monday()), &roster, &[])
            .unwrap_err();
        assert_eq!(err, CarebookError::UnknownStaff(unknown.to_string()));
    }

    #[test]
    fn test_invalid_durations_are_rejected() {
        let valid = service(30);
        let roster = vec![member("Alex", &valid, time(9, 0), time(12, 0))];
        let aggregator = aggregator();

        for minutes in [0, -30, 240] {
            let mut service = valid.clone();
            service.duration_minutes = minutes;
            let query = SlotQuery::for_staff(service, roster[0].id, monday());
            assert_eq!(
                aggregator.find_slots(&query, &roster, &[]),
                Err(CarebookError::InvalidDuration { minutes })
            );
        }
    }

    #[test]
    fn test_range_spans_multiple_days() {
        let service = service(60);
        let roster = vec![member("Alex", &service, time(9, 0), time(10, 0))];
        let query = SlotQuery::any_staff(service, monday());
        let aggregator = aggregator();

        let tuesday = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
        let slots =
            aggregator.find_slots_in_range(&query, monday(), wednesday, &roster, &[]).unwrap();
        let starts: Vec<_> = slots.iter().map(|slot| slot.start).collect();
        assert_eq!(starts, vec![at(6, 9, 0), at(7, 9, 0)]);

        assert!(matches!(
            aggregator.find_slots_in_range(&query, tuesday, monday(), &roster, &[]),
            Err(CarebookError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_next_available_skips_booked_and_closed_days() {
        let service = service(60);
        let alex = member("Alex", &service, time(9, 0), time(10, 0));
        let roster = vec![alex.clone()];
        let booked = vec![Appointment::scheduled(alex.id, at(7, 9, 0), 60)];
        let aggregator = aggregator();

        // Monday after hours, Tuesday booked, Wednesday-Sunday closed
        let query = SlotQuery::any_staff(service.clone(), monday());
        let found =
            aggregator.next_available(&query, at(6, 12, 0), &roster, &booked).unwrap().unwrap();
        assert_eq!(found.start, at(13, 9, 0));

        let none = aggregator
            .next_available_within(
                &SlotQuery::any_staff(service, monday()),
                at(6, 12, 0),
                3,
                &roster,
                &booked,
            )
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_oversized_horizon_is_invalid_input() {
        let service = service(60);
        let roster = vec![member("Alex", &service, time(9, 0), time(12, 0))];

        let result = aggregator().next_available_within(
            &SlotQuery::any_staff(service, monday()),
            at(6, 12, 0),
            u32::MAX,
            &roster,
            &[],
        );
        assert!(matches!(result, Err(CarebookError::InvalidInput(_))));
    }

    #[test]
    fn test_roster_search_is_repeatable() {
        let service = service(45);
        let roster = vec![
            member("Alex", &service, time(9, 0), time(12, 0)),
            member("Blake", &service, time(10, 0), time(14, 0)),
            member("Casey", &service, time(8, 0), time(11, 0)),
        ];
        let booked = vec![
            Appointment::scheduled(roster[0].id, at(6, 9, 30), 60),
            Appointment::scheduled(roster[1].id, at(6, 11, 0), 30),
        ];
        let query = SlotQuery::any_staff(service, monday());
        let aggregator = aggregator();

        let first = aggregator.find_slots(&query, &roster, &booked).unwrap();
        let second = aggregator.find_slots(&query, &roster, &booked).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert_eq!(
            aggregator.find_slots_by_staff(&query, &roster, &booked).unwrap(),
            aggregator.find_slots_by_staff(&query, &roster, &booked).unwrap()
        );
    }
}
