//! Payroll aggregation.
//!
//! This module turns a roster and a set of attendance events into a
//! [`PayrollReport`]. It is the single row-construction path: the
//! interactive report and the tabular export are both built from its output.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use rust_decimal::Decimal;

use crate::models::{AttendanceEvent, PayrollReport, PayrollRow, Person, PersonId, ReportRange};

use super::quarter_hour::round_to_quarter_hour;
use super::worked_hours::{duration_to_hours, total_worked_duration};

/// Builds the payroll report for a range.
///
/// Every person in `persons` gets exactly one row, including persons with no
/// events in the range (outer join). A person listed twice keeps the first
/// record. Events are counted only if their clock-in lies within `range` and
/// their person is listed; open events and events that end at or before they
/// start add nothing.
///
/// Per person, worked time is summed exactly, converted to hours and rounded
/// to the nearest quarter hour before pay is computed. The grand total sums
/// the already-rounded rows. Rows are ordered by person id, so equal inputs
/// always give equal reports.
///
/// # Examples
///
/// ```
/// use dtr_payroll::calculation::build_payroll_report;
/// use dtr_payroll::models::{AttendanceEvent, EventId, Person, PersonId, ReportRange};
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let person = Person {
///     id: PersonId(1),
///     name: "Ana Reyes".to_string(),
///     role: "Instructor".to_string(),
///     hourly_rate: Decimal::new(100, 0),
///     active: true,
///     token: "a1b2".to_string(),
/// };
/// let event = AttendanceEvent {
///     id: EventId(1),
///     person_id: PersonId(1),
///     in_time: at("2026-01-15 08:00:00"),
///     out_time: Some(at("2026-01-15 12:30:00")),
/// };
/// let range = ReportRange::new(None, None, at("2026-01-16 00:00:00"));
///
/// let report = build_payroll_report(range, &[person], &[event]);
/// assert_eq!(report.rows[0].total_hours, Decimal::new(45, 1));
/// assert_eq!(report.grand_total, Decimal::new(450, 0));
/// ```
pub fn build_payroll_report(
    range: ReportRange,
    persons: &[Person],
    events: &[AttendanceEvent],
) -> PayrollReport {
    let mut roster: BTreeMap<PersonId, (&Person, Vec<&AttendanceEvent>)> = BTreeMap::new();
    for person in persons {
        roster.entry(person.id).or_insert((person, Vec::new()));
    }

    for event in events.iter().filter(|event| range.contains(event.in_time)) {
        if let Some((_, person_events)) = roster.get_mut(&event.person_id) {
            person_events.push(event);
        }
    }

    let rows: Vec<PayrollRow> = roster
        .into_values()
        .map(|(person, person_events)| build_row(person, total_worked_duration(person_events)))
        .collect();
    let grand_total: Decimal = rows.iter().map(|row| row.pay).sum();

    PayrollReport {
        range,
        rows,
        grand_total,
    }
}

fn build_row(person: &Person, duration: TimeDelta) -> PayrollRow {
    let total_hours = round_to_quarter_hour(duration_to_hours(duration));
    PayrollRow {
        person_id: person.id,
        name: person.name.clone(),
        role: person.role.clone(),
        hourly_rate: person.hourly_rate,
        total_hours,
        pay: total_hours * person.hourly_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::is_quarter_hour_multiple;
    use crate::models::EventId;
    use chrono::{NaiveDate, NaiveDateTime};
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_person(id: i64, rate: &str) -> Person {
        Person {
            id: PersonId(id),
            name: format!("Person {}", id),
            role: "Instructor".to_string(),
            hourly_rate: dec(rate),
            active: true,
            token: format!("token-{}", id),
        }
    }

    fn make_event(
        id: i64,
        person_id: i64,
        date: &str,
        in_time: &str,
        out_time: Option<&str>,
    ) -> AttendanceEvent {
        AttendanceEvent {
            id: EventId(id),
            person_id: PersonId(person_id),
            in_time: make_datetime(date, in_time),
            out_time: out_time.map(|t| make_datetime(date, t)),
        }
    }

    fn day_range(date: &str) -> ReportRange {
        ReportRange::from_dates(
            Some(make_date(date)),
            Some(make_date(date)),
            make_datetime("2026-02-01", "00:00:00"),
        )
    }

    /// PR-001: 08:00 to 12:30 at 100/hr
    #[test]
    fn test_half_day_at_100_per_hour() {
        let persons = vec![make_person(1, "100")];
        let events = vec![make_event(1, 1, "2026-01-15", "08:00:00", Some("12:30:00"))];

        let report = build_payroll_report(day_range("2026-01-15"), &persons, &events);

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].total_hours, dec("4.5"));
        assert_eq!(report.rows[0].pay, dec("450"));
        assert_eq!(report.grand_total, dec("450"));
    }

    /// PR-002: open event only
    #[test]
    fn test_open_event_contributes_nothing() {
        let persons = vec![make_person(1, "100")];
        let events = vec![make_event(1, 1, "2026-01-15", "08:00:00", None)];

        let report = build_payroll_report(day_range("2026-01-15"), &persons, &events);

        assert_eq!(report.rows[0].total_hours, Decimal::ZERO);
        assert_eq!(report.rows[0].pay, Decimal::ZERO);
    }

    /// PR-003: out-time before in-time
    #[test]
    fn test_reversed_event_is_skipped_not_subtracted() {
        let persons = vec![make_person(1, "100")];
        let events = vec![
            make_event(1, 1, "2026-01-15", "08:00:00", Some("10:00:00")),
            make_event(2, 1, "2026-01-15", "15:00:00", Some("11:00:00")),
        ];

        let report = build_payroll_report(day_range("2026-01-15"), &persons, &events);

        assert_eq!(report.rows[0].total_hours, dec("2"));
        assert_eq!(report.rows[0].pay, dec("200"));
    }

    /// PR-004: persons without events still appear
    #[test]
    fn test_persons_without_events_get_zero_rows() {
        let persons = vec![make_person(2, "90"), make_person(1, "100"), make_person(3, "80")];
        let events = vec![make_event(1, 1, "2026-01-15", "08:00:00", Some("09:00:00"))];

        let report = build_payroll_report(day_range("2026-01-15"), &persons, &events);

        let ids: Vec<i64> = report.rows.iter().map(|r| r.person_id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(report.row(PersonId(2)).unwrap().pay, Decimal::ZERO);
        assert_eq!(report.row(PersonId(3)).unwrap().total_hours, Decimal::ZERO);
        assert_eq!(report.grand_total, dec("100"));
    }

    /// PR-005: rounding happens per person before summation
    #[test]
    fn test_grand_total_sums_rounded_rows() {
        let persons = vec![make_person(1, "100"), make_person(2, "100")];
        // 7.5 min each: 0.125 h rounds up to 0.25 h per person
        let events = vec![
            make_event(1, 1, "2026-01-15", "08:00:00", Some("08:07:30")),
            make_event(2, 2, "2026-01-15", "08:00:00", Some("08:07:30")),
        ];

        let report = build_payroll_report(day_range("2026-01-15"), &persons, &events);

        assert_eq!(report.rows[0].total_hours, dec("0.25"));
        assert_eq!(report.rows[1].total_hours, dec("0.25"));
        assert_eq!(report.grand_total, dec("50"));
    }

    /// PR-006: rounding applies to the per-person sum, not each event
    #[test]
    fn test_rounding_applies_to_person_total() {
        let persons = vec![make_person(1, "100")];
        // Two 5-minute events: each alone would round to 0, together 10 min rounds to 0.25
        let events = vec![
            make_event(1, 1, "2026-01-15", "08:00:00", Some("08:05:00")),
            make_event(2, 1, "2026-01-15", "09:00:00", Some("09:05:00")),
        ];

        let report = build_payroll_report(day_range("2026-01-15"), &persons, &events);

        assert_eq!(report.rows[0].total_hours, dec("0.25"));
    }

    #[test]
    fn test_events_outside_range_are_ignored() {
        let persons = vec![make_person(1, "100")];
        let events = vec![
            make_event(1, 1, "2026-01-14", "08:00:00", Some("12:00:00")),
            make_event(2, 1, "2026-01-15", "08:00:00", Some("09:00:00")),
            make_event(3, 1, "2026-01-16", "08:00:00", Some("12:00:00")),
        ];

        let report = build_payroll_report(day_range("2026-01-15"), &persons, &events);

        assert_eq!(report.rows[0].total_hours, dec("1"));
    }

    #[test]
    fn test_event_clocked_in_before_range_end_counts_fully() {
        let persons = vec![make_person(1, "100")];
        let events = vec![AttendanceEvent {
            id: EventId(1),
            person_id: PersonId(1),
            in_time: make_datetime("2026-01-15", "22:00:00"),
            out_time: Some(make_datetime("2026-01-16", "06:00:00")),
        }];

        let report = build_payroll_report(day_range("2026-01-15"), &persons, &events);

        assert_eq!(report.rows[0].total_hours, dec("8"));
    }

    #[test]
    fn test_events_of_unlisted_persons_are_ignored() {
        let persons = vec![make_person(1, "100")];
        let events = vec![make_event(1, 99, "2026-01-15", "08:00:00", Some("16:00:00"))];

        let report = build_payroll_report(day_range("2026-01-15"), &persons, &events);

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.grand_total, Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_person_listed_once() {
        let persons = vec![make_person(1, "100"), make_person(1, "999")];
        let events = vec![make_event(1, 1, "2026-01-15", "08:00:00", Some("09:00:00"))];

        let report = build_payroll_report(day_range("2026-01-15"), &persons, &events);

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].hourly_rate, dec("100"));
    }

    #[test]
    fn test_inverted_range_reports_all_zero_rows() {
        let persons = vec![make_person(1, "100"), make_person(2, "90")];
        let events = vec![make_event(1, 1, "2026-01-15", "08:00:00", Some("12:00:00"))];
        let range = ReportRange::from_dates(
            Some(make_date("2026-01-20")),
            Some(make_date("2026-01-10")),
            make_datetime("2026-02-01", "00:00:00"),
        );

        let report = build_payroll_report(range, &persons, &events);

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.grand_total, Decimal::ZERO);
    }

    #[test]
    fn test_empty_roster_gives_empty_report() {
        let events = vec![make_event(1, 1, "2026-01-15", "08:00:00", Some("12:00:00"))];
        let report = build_payroll_report(day_range("2026-01-15"), &[], &events);
        assert!(report.rows.is_empty());
        assert_eq!(report.grand_total, Decimal::ZERO);
    }

    #[test]
    fn test_fractional_rate_pay() {
        let persons = vec![make_person(1, "28.54")];
        let events = vec![make_event(1, 1, "2026-01-15", "09:00:00", Some("17:00:00"))];

        let report = build_payroll_report(day_range("2026-01-15"), &persons, &events);

        assert_eq!(report.rows[0].pay, dec("228.32"));
    }

    #[test]
    fn test_identical_inputs_give_identical_reports() {
        let persons = vec![make_person(3, "80"), make_person(1, "100")];
        let events = vec![
            make_event(1, 1, "2026-01-15", "08:00:00", Some("12:10:00")),
            make_event(2, 3, "2026-01-15", "13:00:00", Some("14:20:00")),
        ];

        let first = build_payroll_report(day_range("2026-01-15"), &persons, &events);
        let second = build_payroll_report(day_range("2026-01-15"), &persons, &events);

        assert_eq!(first, second);
    }

    fn arb_event(person_count: i64) -> impl Strategy<Value = (i64, i64, i64)> {
        // (person id, clock-in minute of day, signed length in minutes)
        (1..=person_count, 0i64..1_440, -600i64..900)
    }

    proptest! {
        #[test]
        fn prop_report_invariants(
            rates in proptest::collection::vec(0u32..50_000, 1..6),
            raw_events in proptest::collection::vec(arb_event(5), 0..40),
        ) {
            let persons: Vec<Person> = rates
                .iter()
                .enumerate()
                .map(|(i, cents)| {
                    let mut person = make_person(i as i64 + 1, "0");
                    person.hourly_rate = Decimal::new(*cents as i64, 2);
                    person
                })
                .collect();
            let base = make_datetime("2026-01-15", "00:00:00");
            let events: Vec<AttendanceEvent> = raw_events
                .iter()
                .enumerate()
                .map(|(i, (person_id, start, length))| {
                    let in_time = base + TimeDelta::minutes(*start);
                    AttendanceEvent {
                        id: EventId(i as i64 + 1),
                        person_id: PersonId(*person_id),
                        in_time,
                        out_time: if *length == 0 { None } else { Some(in_time + TimeDelta::minutes(*length)) },
                    }
                })
                .collect();

            let report = build_payroll_report(day_range("2026-01-15"), &persons, &events);

            // every listed person exactly once
            prop_assert_eq!(report.rows.len(), persons.len());
            for row in &report.rows {
                prop_assert!(row.total_hours >= Decimal::ZERO);
                prop_assert!(is_quarter_hour_multiple(row.total_hours));
                prop_assert_eq!(row.pay, row.total_hours * row.hourly_rate);
            }
            let summed: Decimal = report.rows.iter().map(|r| r.pay).sum();
            prop_assert_eq!(report.grand_total, summed);
        }
    }
}
