//! Shared state for the services backed by the configured database.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::error::DtrResult;
use crate::store::SqliteStore;

use super::attendance::AttendanceRecorder;
use super::clock::{Clock, SystemClock};
use super::payroll::PayrollService;

/// Shared service state.
///
/// Holds the configuration, the database and the services built over it.
/// Cloning is cheap; every clone shares the same store and the same
/// per-person scan locks.
#[derive(Clone)]
pub struct DtrState {
    config: Arc<ConfigLoader>,
    store: Arc<SqliteStore>,
    recorder: Arc<AttendanceRecorder<SqliteStore>>,
    payroll: Arc<PayrollService<SqliteStore, SqliteStore>>,
}

impl DtrState {
    /// Opens the configured database and builds the services over it,
    /// reading time from the system clock at the configured offset.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the database cannot be opened.
    pub fn open(config: ConfigLoader) -> DtrResult<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::from_config(&config));
        let store = Arc::new(SqliteStore::from_config(&config.config().storage)?);
        Ok(Self::with_store(config, store, clock))
    }

    /// Builds the services over an already-open store and a given clock.
    pub fn with_store(config: ConfigLoader, store: Arc<SqliteStore>, clock: Arc<dyn Clock>) -> Self {
        let recorder = AttendanceRecorder::new(Arc::clone(&store), Arc::clone(&clock));
        let payroll = PayrollService::new(Arc::clone(&store), Arc::clone(&store), clock)
            .with_config(&config.config().payroll);

        Self {
            config: Arc::new(config),
            store,
            recorder: Arc::new(recorder),
            payroll: Arc::new(payroll),
        }
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the store, which also serves roster administration.
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Returns the attendance recorder.
    pub fn recorder(&self) -> &AttendanceRecorder<SqliteStore> {
        &self.recorder
    }

    /// Returns the payroll service.
    pub fn payroll(&self) -> &PayrollService<SqliteStore, SqliteStore> {
        &self.payroll
    }
}
