//! Configuration types for the DTR payroll core.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file. Every field has a
//! default, so a partial file (or none at all) yields a usable config.

use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use serde::Deserialize;

use crate::models::RosterFilter;

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the SQLite database file.
    pub database_path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/dtr.db"),
            busy_timeout_ms: 5000,
        }
    }
}

impl StorageConfig {
    /// The busy timeout as a `Duration`.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Wall-clock settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Offset from UTC, in minutes, of the site's local time.
    pub utc_offset_minutes: i32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        // UTC+08:00
        Self {
            utc_offset_minutes: 480,
        }
    }
}

impl ClockConfig {
    /// The configured offset, or `None` if it is outside ±24 hours.
    pub fn offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }
}

/// Payroll settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    /// Which persons a payroll report lists.
    pub roster: RosterFilter,
}

/// The complete configuration.
///
/// # Example
///
/// ```
/// use dtr_payroll::config::DtrConfig;
/// use dtr_payroll::models::RosterFilter;
///
/// let config = DtrConfig::default();
/// assert_eq!(config.storage.busy_timeout_ms, 5000);
/// assert_eq!(config.payroll.roster, RosterFilter::All);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DtrConfig {
    /// Storage settings.
    pub storage: StorageConfig,
    /// Wall-clock settings.
    pub clock: ClockConfig,
    /// Payroll settings.
    pub payroll: PayrollConfig,
}
