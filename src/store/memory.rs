//! In-memory store.
//!
//! Persons and events live in one `RwLock`-guarded state, so every
//! operation observes a consistent snapshot and every mutation is applied
//! whole or not at all.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::{DtrError, DtrResult};
use crate::models::{
    AttendanceEvent, EventId, NewPerson, Person, PersonId, ReportRange, RosterFilter, ScanAction,
    ScanOutcome, generate_token,
};

use super::{EventLog, IdentityStore, Roster};

#[derive(Debug, Default)]
struct State {
    persons: BTreeMap<PersonId, Person>,
    events: Vec<AttendanceEvent>,
    last_person_id: i64,
    last_event_id: i64,
}

impl State {
    fn event_mut(&mut self, event_id: EventId) -> DtrResult<&mut AttendanceEvent> {
        self.events
            .iter_mut()
            .find(|event| event.id == event_id)
            .ok_or(DtrError::EventNotFound { event_id })
    }

    fn push_open_event(&mut self, person_id: PersonId, in_time: NaiveDateTime) -> EventId {
        self.last_event_id += 1;
        let event_id = EventId(self.last_event_id);
        self.events.push(AttendanceEvent {
            id: event_id,
            person_id,
            in_time,
            out_time: None,
        });
        event_id
    }

    fn person_mut(&mut self, person_id: PersonId) -> DtrResult<&mut Person> {
        self.persons
            .get_mut(&person_id)
            .ok_or(DtrError::PersonNotFound { person_id })
    }
}

/// A store that keeps persons and attendance events in memory.
///
/// # Example
///
/// ```
/// use dtr_payroll::models::{NewPerson, RosterFilter};
/// use dtr_payroll::store::{IdentityStore, InMemoryStore, Roster};
/// use rust_decimal::Decimal;
///
/// let store = InMemoryStore::new();
/// let person = store
///     .register_person(NewPerson::new("Ana Reyes", "Instructor", Decimal::new(150, 0)))
///     .unwrap();
///
/// assert_eq!(store.lookup_by_token(&person.token).unwrap(), person);
/// assert_eq!(store.list_persons(RosterFilter::All).unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a person with a caller-chosen token, for fixtures and imports.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPerson` if validation fails or the token is taken.
    pub fn insert_person_with_token(
        &self,
        person: NewPerson,
        token: impl Into<String>,
    ) -> DtrResult<Person> {
        person.validate()?;
        let token = token.into();
        let mut state = self.write()?;
        if state.persons.values().any(|existing| existing.token == token) {
            return Err(DtrError::InvalidPerson {
                field: "token".to_string(),
                message: "already registered".to_string(),
            });
        }
        state.last_person_id += 1;
        let person = person.into_person(PersonId(state.last_person_id), token);
        state.persons.insert(person.id, person.clone());
        debug!(person_id = %person.id, "Registered person");
        Ok(person)
    }

    fn read(&self) -> DtrResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| DtrError::storage("in-memory store lock poisoned"))
    }

    fn write(&self) -> DtrResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| DtrError::storage("in-memory store lock poisoned"))
    }

    fn collect_events<F>(&self, keep: F) -> DtrResult<Vec<AttendanceEvent>>
    where
        F: Fn(&AttendanceEvent) -> bool,
    {
        let state = self.read()?;
        let mut events: Vec<AttendanceEvent> =
            state.events.iter().filter(|e| keep(e)).cloned().collect();
        events.sort_by_key(|event| (event.in_time, event.id));
        Ok(events)
    }
}

impl IdentityStore for InMemoryStore {
    fn lookup_by_token(&self, token: &str) -> DtrResult<Person> {
        self.read()?
            .persons
            .values()
            .find(|person| person.token == token)
            .cloned()
            .ok_or_else(|| DtrError::TokenNotFound {
                token: token.to_string(),
            })
    }

    fn lookup_by_id(&self, person_id: PersonId) -> DtrResult<Person> {
        self.read()?
            .persons
            .get(&person_id)
            .cloned()
            .ok_or(DtrError::PersonNotFound { person_id })
    }

    fn list_persons(&self, filter: RosterFilter) -> DtrResult<Vec<Person>> {
        Ok(self
            .read()?
            .persons
            .values()
            .filter(|person| filter.includes(person))
            .cloned()
            .collect())
    }
}

impl Roster for InMemoryStore {
    fn register_person(&self, person: NewPerson) -> DtrResult<Person> {
        self.insert_person_with_token(person, generate_token())
    }

    fn set_active(&self, person_id: PersonId, active: bool) -> DtrResult<Person> {
        let mut state = self.write()?;
        let person = state.person_mut(person_id)?;
        person.active = active;
        debug!(person_id = %person_id, active, "Updated person status");
        Ok(person.clone())
    }

    fn toggle_active(&self, person_id: PersonId) -> DtrResult<Person> {
        let mut state = self.write()?;
        let person = state.person_mut(person_id)?;
        person.active = !person.active;
        debug!(person_id = %person_id, active = person.active, "Toggled person status");
        Ok(person.clone())
    }

    fn remove_person(&self, person_id: PersonId) -> DtrResult<()> {
        let mut state = self.write()?;
        state
            .persons
            .remove(&person_id)
            .ok_or(DtrError::PersonNotFound { person_id })?;
        debug!(person_id = %person_id, "Removed person");
        Ok(())
    }
}

impl EventLog for InMemoryStore {
    fn find_open_event(&self, person_id: PersonId) -> DtrResult<Option<AttendanceEvent>> {
        Ok(self
            .read()?
            .events
            .iter()
            .filter(|event| event.person_id == person_id && event.is_open())
            .max_by_key(|event| (event.in_time, event.id))
            .cloned())
    }

    fn insert_event(&self, person_id: PersonId, in_time: NaiveDateTime) -> DtrResult<EventId> {
        Ok(self.write()?.push_open_event(person_id, in_time))
    }

    fn close_event(&self, event_id: EventId, out_time: NaiveDateTime) -> DtrResult<()> {
        let mut state = self.write()?;
        let event = state.event_mut(event_id)?;
        if !event.is_open() {
            return Err(DtrError::EventAlreadyClosed { event_id });
        }
        event.out_time = Some(out_time);
        Ok(())
    }

    fn record_scan_at(&self, person_id: PersonId, at: NaiveDateTime) -> DtrResult<ScanOutcome> {
        let mut state = self.write()?;
        let open = state
            .events
            .iter_mut()
            .filter(|event| event.person_id == person_id && event.is_open())
            .max_by_key(|event| (event.in_time, event.id));

        if let Some(event) = open {
            event.out_time = Some(at);
            return Ok(ScanOutcome {
                event_id: event.id,
                action: ScanAction::Out,
                timestamp: at,
            });
        }

        Ok(ScanOutcome {
            event_id: state.push_open_event(person_id, at),
            action: ScanAction::In,
            timestamp: at,
        })
    }

    fn query_events_in_range(&self, range: &ReportRange) -> DtrResult<Vec<AttendanceEvent>> {
        self.collect_events(|event| range.contains(event.in_time))
    }

    fn events_for_person(
        &self,
        person_id: PersonId,
        range: &ReportRange,
    ) -> DtrResult<Vec<AttendanceEvent>> {
        self.collect_events(|event| event.person_id == person_id && range.contains(event.in_time))
    }
}
