//! Worked-time accumulation.
//!
//! Durations are summed as whole milliseconds and converted to hours once,
//! so a long list of short intervals does not accumulate division error.

use chrono::TimeDelta;
use rust_decimal::Decimal;

use crate::models::AttendanceEvent;

const MILLISECONDS_PER_HOUR: i64 = 3_600_000;

/// Sums the credited duration of every event.
///
/// Open events and events that end at or before they start contribute
/// nothing, so the total is never negative.
pub fn total_worked_duration<'a, I>(events: I) -> TimeDelta
where
    I: IntoIterator<Item = &'a AttendanceEvent>,
{
    events
        .into_iter()
        .map(AttendanceEvent::worked_duration)
        .fold(TimeDelta::zero(), |total, duration| total + duration)
}

/// Converts a duration to fractional hours, at millisecond resolution.
///
/// # Examples
///
/// ```
/// use dtr_payroll::calculation::duration_to_hours;
/// use chrono::TimeDelta;
/// use rust_decimal::Decimal;
///
/// assert_eq!(duration_to_hours(TimeDelta::minutes(270)), Decimal::new(45, 1));
/// ```
pub fn duration_to_hours(duration: TimeDelta) -> Decimal {
    (Decimal::from(duration.num_milliseconds()) / Decimal::from(MILLISECONDS_PER_HOUR)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventId, PersonId};
    use chrono::NaiveDateTime;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn make_event(id: i64, in_time: &str, out_time: Option<&str>) -> AttendanceEvent {
        AttendanceEvent {
            id: EventId(id),
            person_id: PersonId(1),
            in_time: make_datetime("2026-01-15", in_time),
            out_time: out_time.map(|t| make_datetime("2026-01-15", t)),
        }
    }

    #[test]
    fn test_sums_closed_events() {
        let events = vec![
            make_event(1, "08:00:00", Some("12:00:00")),
            make_event(2, "13:00:00", Some("17:30:00")),
        ];
        let total = total_worked_duration(&events);
        assert_eq!(duration_to_hours(total), dec("8.5"));
    }

    #[test]
    fn test_open_and_reversed_events_add_nothing() {
        let events = vec![
            make_event(1, "08:00:00", Some("10:00:00")),
            make_event(2, "14:00:00", Some("11:00:00")),
            make_event(3, "15:00:00", None),
        ];
        let total = total_worked_duration(&events);
        assert_eq!(duration_to_hours(total), dec("2"));
    }

    #[test]
    fn test_empty_events_total_zero() {
        let events: Vec<AttendanceEvent> = vec![];
        assert_eq!(total_worked_duration(&events), TimeDelta::zero());
        assert_eq!(duration_to_hours(TimeDelta::zero()), Decimal::ZERO);
    }

    #[test]
    fn test_millisecond_resolution() {
        let duration = TimeDelta::milliseconds(450_000);
        assert_eq!(duration_to_hours(duration), dec("0.125"));
    }
}
