//! `SQLite`-backed store.
//!
//! One connection serves every operation behind a mutex. Each mutation is a
//! single statement, so it either commits whole or leaves the database
//! untouched. A scan runs its lookup and write inside one `BEGIN IMMEDIATE`
//! transaction, which takes the database write lock up front, so scans
//! through other connections or processes are serialized against it. When
//! another connection holds the lock, statements wait up to the configured
//! busy timeout and then fail with a `Storage` error.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, TransactionBehavior, params};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::error::{DtrError, DtrResult};
use crate::models::{
    AttendanceEvent, EventId, NewPerson, Person, PersonId, ReportRange, RosterFilter, ScanAction,
    ScanOutcome, generate_token,
};

use super::{EventLog, IdentityStore, Roster};

/// Schema SQL embedded at compile time.
const SCHEMA_SQL: &str = include_str!("schema.sql");

const PERSON_COLUMNS: &str = "id, name, role, hourly_rate, active, token";
const EVENT_COLUMNS: &str = "id, person_id, in_time_ms, out_time_ms";

type PersonRow = (i64, String, String, String, bool, String);
type EventRow = (i64, i64, i64, Option<i64>);

/// A store persisted to a `SQLite` database.
///
/// # Example
///
/// ```
/// use dtr_payroll::models::NewPerson;
/// use dtr_payroll::store::{IdentityStore, Roster, SqliteStore};
/// use rust_decimal::Decimal;
///
/// let store = SqliteStore::in_memory().unwrap();
/// let person = store
///     .register_person(NewPerson::new("Ana Reyes", "Instructor", Decimal::new(150, 0)))
///     .unwrap();
/// assert_eq!(store.lookup_by_id(person.id).unwrap().name, "Ana Reyes");
/// ```
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Opens or creates a database at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the database cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> DtrResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(busy_timeout)?;
        Self::initialize_connection(&conn)?;

        info!(path = %path.display(), "Opened attendance database");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens the database named by the storage settings, creating its
    /// parent directory if needed.
    pub fn from_config(config: &StorageConfig) -> DtrResult<Self> {
        if let Some(parent) = config.database_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                DtrError::storage(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        Self::open(&config.database_path, config.busy_timeout())
    }

    /// Creates an in-memory database for testing.
    pub fn in_memory() -> DtrResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_connection(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// The database file path, or `None` for an in-memory database.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn initialize_connection(conn: &Connection) -> DtrResult<()> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn lock(&self) -> DtrResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DtrError::storage("database connection lock poisoned"))
    }

    fn fetch_person(conn: &Connection, person_id: PersonId) -> DtrResult<Person> {
        let row = conn
            .query_row(
                &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
                params![person_id.0],
                read_person_row,
            )
            .optional()?
            .ok_or(DtrError::PersonNotFound { person_id })?;
        person_from_row(row)
    }

    fn fetch_open_event(
        conn: &Connection,
        person_id: PersonId,
    ) -> DtrResult<Option<AttendanceEvent>> {
        let row = conn
            .query_row(
                &format!(
                    "SELECT {EVENT_COLUMNS} FROM attendance_events
                     WHERE person_id = ?1 AND out_time_ms IS NULL
                     ORDER BY in_time_ms DESC, id DESC
                     LIMIT 1"
                ),
                params![person_id.0],
                read_event_row,
            )
            .optional()?;
        row.map(event_from_row).transpose()
    }

    fn append_open_event(
        conn: &Connection,
        person_id: PersonId,
        in_time: NaiveDateTime,
    ) -> DtrResult<EventId> {
        conn.execute(
            "INSERT INTO attendance_events (person_id, in_time_ms, out_time_ms)
             VALUES (?1, ?2, NULL)",
            params![person_id.0, to_millis(in_time)],
        )?;
        Ok(EventId(conn.last_insert_rowid()))
    }

    fn fetch_events(
        &self,
        filter: &str,
        bind: impl rusqlite::Params,
    ) -> DtrResult<Vec<AttendanceEvent>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM attendance_events WHERE {filter}
             ORDER BY in_time_ms ASC, id ASC"
        ))?;
        let rows = stmt
            .query_map(bind, read_event_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(event_from_row).collect()
    }
}

impl IdentityStore for SqliteStore {
    fn lookup_by_token(&self, token: &str) -> DtrResult<Person> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE token = ?1"),
                params![token],
                read_person_row,
            )
            .optional()?
            .ok_or_else(|| DtrError::TokenNotFound {
                token: token.to_string(),
            })?;
        person_from_row(row)
    }

    fn lookup_by_id(&self, person_id: PersonId) -> DtrResult<Person> {
        let conn = self.lock()?;
        Self::fetch_person(&conn, person_id)
    }

    fn list_persons(&self, filter: RosterFilter) -> DtrResult<Vec<Person>> {
        let conn = self.lock()?;
        let active_only = filter == RosterFilter::ActiveOnly;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons
             WHERE ?1 = 0 OR active = 1
             ORDER BY id ASC"
        ))?;
        let rows = stmt
            .query_map(params![active_only], read_person_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(person_from_row).collect()
    }
}

impl Roster for SqliteStore {
    fn register_person(&self, person: NewPerson) -> DtrResult<Person> {
        person.validate()?;
        let token = generate_token();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO persons (name, role, hourly_rate, active, token)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![person.name, person.role, person.hourly_rate.to_string(), token],
        )?;
        let id = PersonId(conn.last_insert_rowid());
        debug!(person_id = %id, "Registered person");
        Ok(person.into_person(id, token))
    }

    fn set_active(&self, person_id: PersonId, active: bool) -> DtrResult<Person> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE persons SET active = ?1 WHERE id = ?2",
            params![active, person_id.0],
        )?;
        if changed == 0 {
            return Err(DtrError::PersonNotFound { person_id });
        }
        debug!(person_id = %person_id, active, "Updated person status");
        Self::fetch_person(&conn, person_id)
    }

    fn toggle_active(&self, person_id: PersonId) -> DtrResult<Person> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE persons SET active = 1 - active WHERE id = ?1",
            params![person_id.0],
        )?;
        if changed == 0 {
            return Err(DtrError::PersonNotFound { person_id });
        }
        let person = Self::fetch_person(&conn, person_id)?;
        debug!(person_id = %person_id, active = person.active, "Toggled person status");
        Ok(person)
    }

    fn remove_person(&self, person_id: PersonId) -> DtrResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM persons WHERE id = ?1", params![person_id.0])?;
        if changed == 0 {
            return Err(DtrError::PersonNotFound { person_id });
        }
        debug!(person_id = %person_id, "Removed person");
        Ok(())
    }
}

impl EventLog for SqliteStore {
    fn find_open_event(&self, person_id: PersonId) -> DtrResult<Option<AttendanceEvent>> {
        let conn = self.lock()?;
        Self::fetch_open_event(&conn, person_id)
    }

    fn insert_event(&self, person_id: PersonId, in_time: NaiveDateTime) -> DtrResult<EventId> {
        let conn = self.lock()?;
        Self::append_open_event(&conn, person_id, in_time)
    }

    fn close_event(&self, event_id: EventId, out_time: NaiveDateTime) -> DtrResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE attendance_events SET out_time_ms = ?1
             WHERE id = ?2 AND out_time_ms IS NULL",
            params![to_millis(out_time), event_id.0],
        )?;
        if changed == 1 {
            return Ok(());
        }

        let exists = conn
            .query_row(
                "SELECT 1 FROM attendance_events WHERE id = ?1",
                params![event_id.0],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            Err(DtrError::EventAlreadyClosed { event_id })
        } else {
            Err(DtrError::EventNotFound { event_id })
        }
    }

    fn record_scan_at(&self, person_id: PersonId, at: NaiveDateTime) -> DtrResult<ScanOutcome> {
        let mut conn = self.lock()?;
        // Dropping the transaction on an early return rolls it back.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcome = match Self::fetch_open_event(&tx, person_id)? {
            None => ScanOutcome {
                event_id: Self::append_open_event(&tx, person_id, at)?,
                action: ScanAction::In,
                timestamp: at,
            },
            Some(event) => {
                tx.execute(
                    "UPDATE attendance_events SET out_time_ms = ?1 WHERE id = ?2",
                    params![to_millis(at), event.id.0],
                )?;
                ScanOutcome {
                    event_id: event.id,
                    action: ScanAction::Out,
                    timestamp: at,
                }
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn query_events_in_range(&self, range: &ReportRange) -> DtrResult<Vec<AttendanceEvent>> {
        self.fetch_events(
            "(?1 IS NULL OR in_time_ms >= ?1) AND in_time_ms <= ?2",
            params![range.start.map(to_millis), to_millis(range.end)],
        )
    }

    fn events_for_person(
        &self,
        person_id: PersonId,
        range: &ReportRange,
    ) -> DtrResult<Vec<AttendanceEvent>> {
        self.fetch_events(
            "person_id = ?3 AND (?1 IS NULL OR in_time_ms >= ?1) AND in_time_ms <= ?2",
            params![range.start.map(to_millis), to_millis(range.end), person_id.0],
        )
    }
}

fn to_millis(at: NaiveDateTime) -> i64 {
    at.and_utc().timestamp_millis()
}

fn from_millis(millis: i64) -> DtrResult<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis)
        .map(|at| at.naive_utc())
        .ok_or_else(|| DtrError::storage(format!("timestamp out of range: {millis}")))
}

fn read_person_row(row: &Row<'_>) -> rusqlite::Result<PersonRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn person_from_row((id, name, role, rate, active, token): PersonRow) -> DtrResult<Person> {
    let hourly_rate = Decimal::from_str(&rate)
        .map_err(|e| DtrError::storage(format!("invalid hourly rate '{rate}' for person {id}: {e}")))?;
    Ok(Person {
        id: PersonId(id),
        name,
        role,
        hourly_rate,
        active,
        token,
    })
}

fn read_event_row(row: &Row<'_>) -> rusqlite::Result<EventRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn event_from_row((id, person_id, in_ms, out_ms): EventRow) -> DtrResult<AttendanceEvent> {
    Ok(AttendanceEvent {
        id: EventId(id),
        person_id: PersonId(person_id),
        in_time: from_millis(in_ms)?,
        out_time: out_ms.map(from_millis).transpose()?,
    })
}
