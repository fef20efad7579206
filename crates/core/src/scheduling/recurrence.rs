//! Recurrence expansion
//!
//! Steps are taken on local wall-clock time in the expander's timezone, so a
//! weekly 09:00 series stays at 09:00 across DST changes.

use carebook_domain::{
    CarebookError, RecurrenceEnd, RecurrenceFrequency, RecurrencePattern, Result,
    SchedulingConfig,
};
use chrono::{DateTime, Datelike, Days, Months, NaiveDateTime, Utc, Weekday};
use chrono_tz::Tz;

use super::calendar::local_to_utc;

/// Caller-supplied rule for `custom` patterns
pub trait CustomRecurrence {
    /// Next occurrence strictly after `after`, or `None` when the series ends
    fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

impl<F> CustomRecurrence for F
where
    F: Fn(DateTime<Utc>) -> Option<DateTime<Utc>>,
{
    fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self(after)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecurrenceExpander {
    max_occurrences: u32,
    timezone: Tz,
}

impl RecurrenceExpander {
    pub fn new(config: &SchedulingConfig) -> Self {
        Self { max_occurrences: config.max_recurrence_occurrences, timezone: Tz::UTC }
    }

    /// Step in the given timezone instead of UTC
    pub fn in_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Configured cap for open-ended series
    pub fn max_occurrences(&self) -> u32 {
        self.max_occurrences
    }

    /// Next occurrence after `after`, ignoring the end condition
    pub fn next_occurrence(
        &self,
        pattern: &RecurrencePattern,
        after: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        pattern.validate()?;
        if pattern.frequency == RecurrenceFrequency::Custom {
            return Err(unsupported_custom());
        }
        Ok(self.step(pattern, after))
    }

    /// Like [`next_occurrence`](Self::next_occurrence), resolving `custom`
    /// patterns through `rule`
    pub fn next_occurrence_with(
        &self,
        pattern: &RecurrencePattern,
        after: DateTime<Utc>,
        rule: &dyn CustomRecurrence,
    ) -> Result<Option<DateTime<Utc>>> {
        pattern.validate()?;
        Ok(self.advance(pattern, after, Some(rule)))
    }

    /// Occurrence instants starting with `start` itself.
    ///
    /// Stops at the pattern's end condition, and never yields more than
    /// `max_count` instants.
    pub fn expand(
        &self,
        pattern: &RecurrencePattern,
        start: DateTime<Utc>,
        max_count: u32,
    ) -> Result<Vec<DateTime<Utc>>> {
        if pattern.frequency == RecurrenceFrequency::Custom {
            pattern.validate()?;
            return Err(unsupported_custom());
        }
        self.expand_inner(pattern, start, max_count, None)
    }

    pub fn expand_with(
        &self,
        pattern: &RecurrencePattern,
        start: DateTime<Utc>,
        max_count: u32,
        rule: &dyn CustomRecurrence,
    ) -> Result<Vec<DateTime<Utc>>> {
        self.expand_inner(pattern, start, max_count, Some(rule))
    }

    fn expand_inner(
        &self,
        pattern: &RecurrencePattern,
        start: DateTime<Utc>,
        max_count: u32,
        rule: Option<&dyn CustomRecurrence>,
    ) -> Result<Vec<DateTime<Utc>>> {
        pattern.validate()?;

        let cap = match pattern.end {
            RecurrenceEnd::AfterOccurrences(count) => count.min(max_count),
            RecurrenceEnd::Never | RecurrenceEnd::OnDate(_) => max_count,
        };
        let until = match pattern.end {
            RecurrenceEnd::OnDate(until) => Some(until),
            _ => None,
        };

        let mut occurrences = Vec::new();
        if cap == 0 || until.is_some_and(|until| start > until) {
            return Ok(occurrences);
        }

        let anchor = start.with_timezone(&self.timezone).naive_local();
        let mut current = start;
        occurrences.push(current);

        while occurrences.len() < cap as usize {
            let next = match pattern.frequency {
                // Anchored on the first start so the 31st does not drift to the 28th
                RecurrenceFrequency::Monthly => pattern
                    .interval
                    .checked_mul(occurrences.len() as u32)
                    .and_then(|months| anchor.checked_add_months(Months::new(months)))
                    .map(|local| self.resolve(local, anchor, start)),
                _ => self.advance(pattern, current, rule),
            };

            let Some(next) = next else { break };
            if next <= current || until.is_some_and(|until| next > until) {
                break;
            }
            occurrences.push(next);
            current = next;
        }

        Ok(occurrences)
    }

    fn advance(
        &self,
        pattern: &RecurrencePattern,
        after: DateTime<Utc>,
        rule: Option<&dyn CustomRecurrence>,
    ) -> Option<DateTime<Utc>> {
        match pattern.frequency {
            RecurrenceFrequency::Custom => {
                rule.and_then(|rule| rule.next_after(after)).filter(|next| *next > after)
            }
            _ => self.step(pattern, after),
        }
    }

    fn step(&self, pattern: &RecurrencePattern, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local = after.with_timezone(&self.timezone).naive_local();
        let interval = pattern.interval;

        let next = match pattern.frequency {
            RecurrenceFrequency::Daily => local.checked_add_days(Days::new(u64::from(interval))),
            RecurrenceFrequency::Weekly => {
                weekly_step(local, interval, pattern.days_of_week.as_deref())
            }
            RecurrenceFrequency::BiWeekly => {
                weekly_step(local, interval.checked_mul(2)?, pattern.days_of_week.as_deref())
            }
            RecurrenceFrequency::Monthly => local.checked_add_months(Months::new(interval)),
            RecurrenceFrequency::Custom => None,
        }?;

        Some(self.resolve(next, local, after))
    }

    /// Map a stepped local time back to an instant. A local time swallowed by
    /// a DST gap keeps the same elapsed distance from `origin` instead.
    fn resolve(
        &self,
        local: NaiveDateTime,
        origin_local: NaiveDateTime,
        origin: DateTime<Utc>,
    ) -> DateTime<Utc> {
        local_to_utc(self.timezone, local).unwrap_or_else(|| origin + (local - origin_local))
    }
}

/// Advance to the next listed weekday later this week, otherwise to the
/// first listed weekday `weeks` weeks on.
fn weekly_step(local: NaiveDateTime, weeks: u32, days: Option<&[Weekday]>) -> Option<NaiveDateTime> {
    let week = u64::from(weeks) * 7;
    let Some(days) = days else {
        return local.checked_add_days(Days::new(week));
    };

    let today = u64::from(local.weekday().num_days_from_monday());
    let mut offsets: Vec<u64> =
        days.iter().map(|day| u64::from(day.num_days_from_monday())).collect();
    offsets.sort_unstable();
    offsets.dedup();

    let ahead = match offsets.iter().find(|offset| **offset > today) {
        Some(later) => later - today,
        None => week - today + offsets.first()?,
    };
    local.checked_add_days(Days::new(ahead))
}

fn unsupported_custom() -> CarebookError {
    CarebookError::UnsupportedRecurrence("custom patterns need a caller-supplied rule".into())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn expander() -> RecurrenceExpander {
        RecurrenceExpander::new(&SchedulingConfig::default())
    }

    fn pattern(frequency: RecurrenceFrequency, interval: u32, end: RecurrenceEnd) -> RecurrencePattern {
        RecurrencePattern::new(frequency, interval, end)
    }

    #[test]
    fn test_weekly_after_four_occurrences() {
        let start = at(2024, 5, 6, 10);
        let weekly = pattern(RecurrenceFrequency::Weekly, 1, RecurrenceEnd::AfterOccurrences(4));
        let dates = expander().expand(&weekly, start, 52).unwrap();

        assert_eq!(dates.len(), 4);
        assert_eq!(dates[0], start);
        assert!(dates.windows(2).all(|pair| pair[1] - pair[0] == Duration::days(7)));
        assert!(dates.iter().all(|date| date.weekday() == Weekday::Mon));
    }

    #[test]
    fn test_daily_and_bi_weekly_steps() {
        let start = at(2024, 5, 6, 10);
        let expander = expander();

        let daily = pattern(RecurrenceFrequency::Daily, 2, RecurrenceEnd::AfterOccurrences(3));
        assert_eq!(
            expander.expand(&daily, start, 52).unwrap(),
            vec![start, at(2024, 5, 8, 10), at(2024, 5, 10, 10)]
        );

        let bi_weekly =
            pattern(RecurrenceFrequency::BiWeekly, 1, RecurrenceEnd::AfterOccurrences(3));
        assert_eq!(
            expander.expand(&bi_weekly, start, 52).unwrap(),
            vec![start, at(2024, 5, 20, 10), at(2024, 6, 3, 10)]
        );
    }

    #[test]
    fn test_monthly_is_anchored_on_start() {
        let start = at(2024, 1, 31, 9);
        let monthly = pattern(RecurrenceFrequency::Monthly, 1, RecurrenceEnd::AfterOccurrences(4));
        let dates = expander().expand(&monthly, start, 52).unwrap();

        assert_eq!(
            dates,
            vec![start, at(2024, 2, 29, 9), at(2024, 3, 31, 9), at(2024, 4, 30, 9)]
        );
    }

    #[test]
    fn test_days_of_week_walk_within_and_across_weeks() {
        let start = at(2024, 5, 6, 10);
        let expander = expander();

        let mwf = pattern(RecurrenceFrequency::Weekly, 1, RecurrenceEnd::AfterOccurrences(4))
            .with_days_of_week(vec![Weekday::Fri, Weekday::Mon, Weekday::Wed]);
        assert_eq!(
            expander.expand(&mwf, start, 52).unwrap(),
            vec![start, at(2024, 5, 8, 10), at(2024, 5, 10, 10), at(2024, 5, 13, 10)]
        );

        let tuesday = at(2024, 5, 7, 10);
        let tue_thu = pattern(RecurrenceFrequency::BiWeekly, 1, RecurrenceEnd::AfterOccurrences(3))
            .with_days_of_week(vec![Weekday::Tue, Weekday::Thu]);
        assert_eq!(
            expander.expand(&tue_thu, tuesday, 52).unwrap(),
            vec![tuesday, at(2024, 5, 9, 10), at(2024, 5, 21, 10)]
        );
    }

    #[test]
    fn test_on_date_is_inclusive() {
        let start = at(2024, 5, 6, 10);
        let until = pattern(
            RecurrenceFrequency::Weekly,
            1,
            RecurrenceEnd::OnDate(at(2024, 5, 20, 10)),
        );
        let dates = expander().expand(&until, start, 52).unwrap();
        assert_eq!(dates.len(), 3);
        assert_eq!(*dates.last().unwrap(), at(2024, 5, 20, 10));

        let already_past = pattern(
            RecurrenceFrequency::Weekly,
            1,
            RecurrenceEnd::OnDate(at(2024, 5, 1, 10)),
        );
        assert!(expander().expand(&already_past, start, 52).unwrap().is_empty());
    }

    #[test]
    fn test_max_count_caps_every_end_condition() {
        let start = at(2024, 5, 6, 10);
        let expander = expander();

        let never = pattern(RecurrenceFrequency::Daily, 1, RecurrenceEnd::Never);
        assert_eq!(expander.expand(&never, start, 10).unwrap().len(), 10);

        let many = pattern(RecurrenceFrequency::Daily, 1, RecurrenceEnd::AfterOccurrences(100));
        assert_eq!(expander.expand(&many, start, 5).unwrap().len(), 5);
        assert!(expander.expand(&many, start, 0).unwrap().is_empty());
    }

    #[test]
    fn test_next_occurrence() {
        let weekly = pattern(RecurrenceFrequency::Weekly, 3, RecurrenceEnd::Never);
        let next = expander().next_occurrence(&weekly, at(2024, 5, 6, 10)).unwrap();
        assert_eq!(next, Some(at(2024, 5, 27, 10)));
    }

    #[test]
    fn test_invalid_patterns_are_rejected() {
        let start = at(2024, 5, 6, 10);
        let zero = pattern(RecurrenceFrequency::Weekly, 0, RecurrenceEnd::Never);
        assert!(matches!(
            expander().expand(&zero, start, 10),
            Err(CarebookError::InvalidRecurrence(_))
        ));

        let empty_days = pattern(RecurrenceFrequency::Weekly, 1, RecurrenceEnd::Never)
            .with_days_of_week(Vec::new());
        assert!(matches!(
            expander().next_occurrence(&empty_days, start),
            Err(CarebookError::InvalidRecurrence(_))
        ));
    }

    #[test]
    fn test_custom_needs_a_rule() {
        let start = at(2024, 5, 6, 10);
        let custom = pattern(RecurrenceFrequency::Custom, 1, RecurrenceEnd::AfterOccurrences(3));
        let expander = expander();

        assert!(matches!(
            expander.expand(&custom, start, 10),
            Err(CarebookError::UnsupportedRecurrence(_))
        ));
        assert!(matches!(
            expander.next_occurrence(&custom, start),
            Err(CarebookError::UnsupportedRecurrence(_))
        ));

        let every_ten_days = |after: DateTime<Utc>| Some(after + Duration::days(10));
        assert_eq!(
            expander.expand_with(&custom, start, 10, &every_ten_days).unwrap(),
            vec![start, at(2024, 5, 16, 10), at(2024, 5, 26, 10)]
        );
        assert_eq!(
            expander.next_occurrence_with(&custom, start, &every_ten_days).unwrap(),
            Some(at(2024, 5, 16, 10))
        );

        // A rule that stops advancing ends the series
        let stuck = |after: DateTime<Utc>| Some(after);
        assert_eq!(expander.expand_with(&custom, start, 10, &stuck).unwrap(), vec![start]);
    }

    #[test]
    fn test_weekly_keeps_local_time_across_dst() {
        use chrono_tz::America::New_York;

        // 09:00 EST on 2024-03-04, clocks spring forward on 2024-03-10
        let start = at(2024, 3, 4, 14);
        let weekly = pattern(RecurrenceFrequency::Weekly, 1, RecurrenceEnd::AfterOccurrences(2));
        let dates = expander().in_timezone(New_York).expand(&weekly, start, 52).unwrap();

        assert_eq!(dates[1], at(2024, 3, 11, 13));
    }
}
