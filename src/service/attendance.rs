//! The attendance state machine.
//!
//! Each scan flips a person between [`AttendanceState::Out`] and
//! [`AttendanceState::In`]. The state is derived from the event log on every
//! scan. The log applies each scan's read-then-write atomically through
//! [`EventLog::record_scan_at`], which holds across handles and processes.
//! Within one recorder, scans of the same person also queue on a
//! per-person lock, so their timestamps are taken in the order they are
//! applied.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::error::{DtrError, DtrResult};
use crate::models::{AttendanceState, PersonId, ScanOutcome, ScanReceipt};
use crate::store::{EventLog, IdentityStore};

use super::clock::Clock;

/// Registry of per-person locks.
///
/// An entry lives only while some scan of that person holds or waits on it,
/// so the registry never grows beyond the number of scans in flight.
#[derive(Debug, Default)]
struct PersonLocks {
    registry: Mutex<HashMap<PersonId, Arc<Mutex<()>>>>,
}

impl PersonLocks {
    /// Runs `f` while holding the person's lock.
    fn with_person<T>(&self, person_id: PersonId, f: impl FnOnce() -> DtrResult<T>) -> DtrResult<T> {
        let handle = self.acquire(person_id)?;
        let result = match handle.lock() {
            Ok(_guard) => f(),
            Err(_) => Err(DtrError::storage(format!(
                "attendance lock poisoned for {person_id}"
            ))),
        };
        self.release(person_id, handle);
        result
    }

    fn acquire(&self, person_id: PersonId) -> DtrResult<Arc<Mutex<()>>> {
        let mut registry = self
            .registry
            .lock()
            .map_err(|_| DtrError::storage("attendance lock registry poisoned"))?;
        Ok(Arc::clone(registry.entry(person_id).or_default()))
    }

    fn release(&self, person_id: PersonId, handle: Arc<Mutex<()>>) {
        // Handles are cloned and dropped only under the registry lock, so a
        // count of two (the registry and this caller) means no other scan
        // holds or waits on the entry.
        if let Ok(mut registry) = self.registry.lock() {
            if Arc::strong_count(&handle) == 2 {
                registry.remove(&person_id);
            }
            drop(handle);
        }
    }
}

/// Records clock-in and clock-out scans against an event log.
///
/// The recorder is meant to be shared across request workers behind an
/// `Arc`; every method takes `&self`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use chrono::{NaiveDate, TimeDelta};
/// use dtr_payroll::models::{AttendanceState, PersonId, ScanAction};
/// use dtr_payroll::service::{AttendanceRecorder, ManualClock};
/// use dtr_payroll::store::InMemoryStore;
///
/// let start = NaiveDate::from_ymd_opt(2026, 1, 15)
///     .unwrap()
///     .and_hms_opt(8, 0, 0)
///     .unwrap();
/// let clock = Arc::new(ManualClock::new(start));
/// let recorder = AttendanceRecorder::new(Arc::new(InMemoryStore::new()), clock.clone());
///
/// let first = recorder.record_scan(PersonId(1)).unwrap();
/// assert_eq!(first.action, ScanAction::In);
/// assert_eq!(recorder.current_state(PersonId(1)).unwrap(), AttendanceState::In);
///
/// clock.advance(TimeDelta::hours(4));
/// let second = recorder.record_scan(PersonId(1)).unwrap();
/// assert_eq!(second.action, ScanAction::Out);
/// assert_eq!(second.event_id, first.event_id);
/// ```
pub struct AttendanceRecorder<L: EventLog + ?Sized> {
    log: Arc<L>,
    clock: Arc<dyn Clock>,
    locks: PersonLocks,
}

impl<L: EventLog + ?Sized> AttendanceRecorder<L> {
    /// Creates a recorder over `log`, reading time from `clock`.
    pub fn new(log: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            log,
            clock,
            locks: PersonLocks::default(),
        }
    }

    /// Records one scan for a person.
    ///
    /// With no open event the scan clocks the person in by appending a new
    /// open event. Otherwise it clocks them out by closing the most recent
    /// open event. Exactly one log mutation happens on success.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the log cannot be read or written, or if the
    /// wait for the log expires. A failed scan performs no mutation.
    pub fn record_scan(&self, person_id: PersonId) -> DtrResult<ScanOutcome> {
        let outcome = self.locks.with_person(person_id, || {
            self.log.record_scan_at(person_id, self.clock.now())
        })?;

        info!(
            person_id = %person_id,
            event_id = %outcome.event_id,
            action = %outcome.action,
            timestamp = %outcome.timestamp,
            "Recorded scan"
        );

        Ok(outcome)
    }

    /// Resolves a scanned token and records the scan for its person.
    ///
    /// # Errors
    ///
    /// Returns `TokenNotFound` if no person carries the token; nothing is
    /// recorded in that case.
    pub fn scan_token<I: IdentityStore + ?Sized>(
        &self,
        identity: &I,
        token: &str,
    ) -> DtrResult<ScanReceipt> {
        let person = identity.lookup_by_token(token)?;
        let outcome = self.record_scan(person.id)?;
        Ok(ScanReceipt { person, outcome })
    }

    /// Returns whether the person is currently clocked in.
    pub fn current_state(&self, person_id: PersonId) -> DtrResult<AttendanceState> {
        let open = self.log.find_open_event(person_id)?;
        Ok(AttendanceState::from_open_event(open.as_ref()))
    }
}
