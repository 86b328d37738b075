//! Storage collaborators of the DTR payroll core.
//!
//! The core talks to persistence only through the traits defined here:
//! [`IdentityStore`] resolves tokens and lists persons, [`Roster`] holds the
//! administrative mutations on persons, and [`EventLog`] keeps attendance
//! events. Two back-ends implement all three:
//!
//! - [`InMemoryStore`] keeps everything behind a `RwLock`.
//! - [`SqliteStore`] persists to a SQLite database with a bounded busy wait.
//!
//! Every single-event mutation is atomic in both back-ends: an insert or a
//! close either fully commits or leaves the log untouched. A scan's
//! read-then-write goes through [`EventLog::record_scan_at`], which each
//! back-end runs as one atomic step, so two handles on the same data can
//! never both clock a person in.

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use chrono::NaiveDateTime;

use crate::error::DtrResult;
use crate::models::{
    AttendanceEvent, EventId, NewPerson, Person, PersonId, ReportRange, RosterFilter, ScanOutcome,
};

/// Resolves persons for the scan and payroll paths.
pub trait IdentityStore: Send + Sync {
    /// Finds the person carrying `token`.
    ///
    /// # Errors
    ///
    /// Returns `TokenNotFound` if no person carries the token, or `Storage`
    /// if the lookup failed.
    fn lookup_by_token(&self, token: &str) -> DtrResult<Person>;

    /// Finds a person by id.
    ///
    /// # Errors
    ///
    /// Returns `PersonNotFound` if the id does not resolve, or `Storage` if
    /// the lookup failed.
    fn lookup_by_id(&self, person_id: PersonId) -> DtrResult<Person>;

    /// Lists persons passing `filter`, ordered by id.
    fn list_persons(&self, filter: RosterFilter) -> DtrResult<Vec<Person>>;
}

/// Administrative changes to the set of persons.
pub trait Roster: IdentityStore {
    /// Registers a person under a freshly generated token. New persons are active.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPerson` if the record fails validation.
    fn register_person(&self, person: NewPerson) -> DtrResult<Person>;

    /// Sets a person's `active` flag and returns the updated person.
    fn set_active(&self, person_id: PersonId, active: bool) -> DtrResult<Person>;

    /// Flips a person's `active` flag in one step and returns the updated person.
    fn toggle_active(&self, person_id: PersonId) -> DtrResult<Person>;

    /// Removes a person. Their attendance events stay in the log.
    fn remove_person(&self, person_id: PersonId) -> DtrResult<()>;
}

/// The append-only attendance event log.
pub trait EventLog: Send + Sync {
    /// Returns the person's most recent open event, if any.
    fn find_open_event(&self, person_id: PersonId) -> DtrResult<Option<AttendanceEvent>>;

    /// Appends an open event and returns its id.
    fn insert_event(&self, person_id: PersonId, in_time: NaiveDateTime) -> DtrResult<EventId>;

    /// Sets the out-time of an open event.
    ///
    /// # Errors
    ///
    /// Returns `EventNotFound` for an unknown id and `EventAlreadyClosed`
    /// if the event already has an out-time; the log is unchanged in both
    /// cases.
    fn close_event(&self, event_id: EventId, out_time: NaiveDateTime) -> DtrResult<()>;

    /// Records one scan at `at` as a single atomic step.
    ///
    /// Closes the person's most recent open event if there is one, and
    /// appends a new open event otherwise. The lookup and the write are
    /// isolated from every other scan against the same data, including scans
    /// through other handles or processes.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the log cannot be read or written, or if the
    /// wait for exclusive access expires; the log is unchanged in that case.
    fn record_scan_at(&self, person_id: PersonId, at: NaiveDateTime) -> DtrResult<ScanOutcome>;

    /// Lists every event whose in-time lies within `range`, ordered by
    /// in-time then id.
    fn query_events_in_range(&self, range: &ReportRange) -> DtrResult<Vec<AttendanceEvent>>;

    /// Lists one person's events whose in-time lies within `range`, oldest first.
    fn events_for_person(
        &self,
        person_id: PersonId,
        range: &ReportRange,
    ) -> DtrResult<Vec<AttendanceEvent>>;
}
