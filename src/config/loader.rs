//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the DTR
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use chrono::FixedOffset;

use crate::error::{DtrError, DtrResult};

use super::types::DtrConfig;

/// Loads and provides access to the DTR configuration.
///
/// # File Format
///
/// ```text
/// storage:
///   database_path: data/dtr.db
///   busy_timeout_ms: 5000
/// clock:
///   utc_offset_minutes: 480
/// payroll:
///   roster: all        # or active_only
/// ```
///
/// # Example
///
/// ```no_run
/// use dtr_payroll::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/dtr.yaml").unwrap();
/// println!("Database: {}", loader.config().storage.database_path.display());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: DtrConfig,
    offset: FixedOffset,
}

impl ConfigLoader {
    /// Loads configuration from the specified YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the file cannot be read, or
    /// `ConfigParseError` if it is not valid YAML or carries an invalid
    /// UTC offset.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dtr_payroll::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/dtr.yaml")?;
    /// # Ok::<(), dtr_payroll::error::DtrError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> DtrResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| DtrError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse(&content, &path_str)
    }

    /// Parses configuration from YAML text. `origin` names the source in errors.
    pub fn parse(content: &str, origin: &str) -> DtrResult<Self> {
        // serde_yaml reads an empty document as unit, not as an empty map
        let config: DtrConfig = if content.trim().is_empty() {
            DtrConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| DtrError::ConfigParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?
        };

        Self::from_config(config, origin)
    }

    /// Wraps an already-built configuration, validating it.
    pub fn from_config(config: DtrConfig, origin: &str) -> DtrResult<Self> {
        let offset = config
            .clock
            .offset()
            .ok_or_else(|| DtrError::ConfigParseError {
                path: origin.to_string(),
                message: format!(
                    "clock.utc_offset_minutes out of range: {}",
                    config.clock.utc_offset_minutes
                ),
            })?;

        Ok(Self { config, offset })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &DtrConfig {
        &self.config
    }

    /// Returns the validated local UTC offset.
    pub fn utc_offset(&self) -> FixedOffset {
        self.offset
    }
}
