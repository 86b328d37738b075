//! Attendance event model and the two-state scan machine.
//!
//! An [`AttendanceEvent`] is opened by a clock-in and closed exactly once by
//! a clock-out. A person's [`AttendanceState`] is never stored; it is derived
//! from whether an open event exists.

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use super::{Person, PersonId};

/// Opaque identifier of an attendance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One attendance interval in a person's daily time record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    /// Unique identifier for the event.
    pub id: EventId,
    /// The person who scanned in. Weak reference; the person may be removed.
    pub person_id: PersonId,
    /// Clock-in time.
    pub in_time: NaiveDateTime,
    /// Clock-out time, absent while the event is open.
    pub out_time: Option<NaiveDateTime>,
}

impl AttendanceEvent {
    /// Returns true while the event has no out-time.
    pub fn is_open(&self) -> bool {
        self.out_time.is_none()
    }

    /// Returns the time credited for this event.
    ///
    /// Open events and events whose out-time is not after the in-time are
    /// credited nothing; the result is never negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use dtr_payroll::models::{AttendanceEvent, EventId, PersonId};
    /// use chrono::{NaiveDateTime, TimeDelta};
    ///
    /// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    /// let event = AttendanceEvent {
    ///     id: EventId(1),
    ///     person_id: PersonId(1),
    ///     in_time: at("2026-01-15 08:00:00"),
    ///     out_time: Some(at("2026-01-15 12:30:00")),
    /// };
    /// assert_eq!(event.worked_duration(), TimeDelta::minutes(270));
    /// ```
    pub fn worked_duration(&self) -> TimeDelta {
        match self.out_time {
            Some(out_time) if out_time > self.in_time => out_time - self.in_time,
            _ => TimeDelta::zero(),
        }
    }
}

/// What a scan did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanAction {
    /// The scan opened a new event.
    In,
    /// The scan closed the open event.
    Out,
}

impl fmt::Display for ScanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanAction::In => write!(f, "Clock IN"),
            ScanAction::Out => write!(f, "Clock OUT"),
        }
    }
}

/// Whether a person is currently clocked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    /// No open event; the next scan clocks in.
    Out,
    /// An open event exists; the next scan clocks out.
    In,
}

impl AttendanceState {
    /// Derives the state from the person's most recent open event.
    pub fn from_open_event(open: Option<&AttendanceEvent>) -> Self {
        match open {
            Some(_) => AttendanceState::In,
            None => AttendanceState::Out,
        }
    }

    /// The action the next scan performs from this state.
    pub fn next_action(self) -> ScanAction {
        match self {
            AttendanceState::Out => ScanAction::In,
            AttendanceState::In => ScanAction::Out,
        }
    }
}

/// The result of recording one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// The event opened or closed by the scan.
    pub event_id: EventId,
    /// Whether the scan clocked in or out.
    pub action: ScanAction,
    /// The recorded in-time or out-time.
    pub timestamp: NaiveDateTime,
}

/// A recorded scan together with the person it was recorded for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReceipt {
    /// The person the scanned token resolved to.
    pub person: Person,
    /// What the scan did.
    pub outcome: ScanOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn make_event(in_time: &str, out_time: Option<&str>) -> AttendanceEvent {
        AttendanceEvent {
            id: EventId(1),
            person_id: PersonId(1),
            in_time: make_datetime("2026-01-15", in_time),
            out_time: out_time.map(|t| make_datetime("2026-01-15", t)),
        }
    }

    #[test]
    fn test_closed_event_duration() {
        let event = make_event("08:00:00", Some("12:30:00"));
        assert!(!event.is_open());
        assert_eq!(event.worked_duration(), TimeDelta::minutes(270));
    }

    #[test]
    fn test_open_event_credits_nothing() {
        let event = make_event("08:00:00", None);
        assert!(event.is_open());
        assert_eq!(event.worked_duration(), TimeDelta::zero());
    }

    #[test]
    fn test_reversed_event_credits_nothing() {
        let event = make_event("12:00:00", Some("08:00:00"));
        assert_eq!(event.worked_duration(), TimeDelta::zero());
    }

    #[test]
    fn test_zero_length_event_credits_nothing() {
        let event = make_event("09:00:00", Some("09:00:00"));
        assert_eq!(event.worked_duration(), TimeDelta::zero());
    }

    #[test]
    fn test_overnight_event() {
        let event = AttendanceEvent {
            id: EventId(2),
            person_id: PersonId(1),
            in_time: make_datetime("2026-01-15", "22:00:00"),
            out_time: Some(make_datetime("2026-01-16", "06:00:00")),
        };
        assert_eq!(event.worked_duration(), TimeDelta::hours(8));
    }

    #[test]
    fn test_state_derivation_and_transitions() {
        let open = make_event("08:00:00", None);

        let out = AttendanceState::from_open_event(None);
        assert_eq!(out, AttendanceState::Out);
        assert_eq!(out.next_action(), ScanAction::In);

        let inside = AttendanceState::from_open_event(Some(&open));
        assert_eq!(inside, AttendanceState::In);
        assert_eq!(inside.next_action(), ScanAction::Out);
    }

    #[test]
    fn test_scan_action_display() {
        assert_eq!(ScanAction::In.to_string(), "Clock IN");
        assert_eq!(ScanAction::Out.to_string(), "Clock OUT");
    }

    #[test]
    fn test_scan_action_serialization() {
        assert_eq!(serde_json::to_string(&ScanAction::In).unwrap(), "\"in\"");
        assert_eq!(serde_json::to_string(&ScanAction::Out).unwrap(), "\"out\"");
    }
}
