//! Error types for the DTR payroll core.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the attendance recorder, the payroll aggregator and
//! the stores behind them can report.

use thiserror::Error;

use crate::models::{EventId, PersonId};

/// The main error type for the DTR payroll core.
///
/// All operations return this error type. The core never logs or retries
/// these errors; presentation code decides how to surface them.
///
/// # Example
///
/// ```
/// use dtr_payroll::error::DtrError;
///
/// let error = DtrError::TokenNotFound {
///     token: "3f9a".to_string(),
/// };
/// assert_eq!(error.to_string(), "No person registered for token: 3f9a");
/// ```
#[derive(Debug, Error)]
pub enum DtrError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No person carries the scanned token.
    #[error("No person registered for token: {token}")]
    TokenNotFound {
        /// The token that did not resolve.
        token: String,
    },

    /// No person exists with the given id.
    #[error("Person not found: {person_id}")]
    PersonNotFound {
        /// The id that did not resolve.
        person_id: PersonId,
    },

    /// No attendance event exists with the given id.
    #[error("Attendance event not found: {event_id}")]
    EventNotFound {
        /// The id that did not resolve.
        event_id: EventId,
    },

    /// The attendance event already has an out-time.
    #[error("Attendance event {event_id} is already closed")]
    EventAlreadyClosed {
        /// The id of the closed event.
        event_id: EventId,
    },

    /// A registration record was invalid.
    #[error("Invalid person field '{field}': {message}")]
    InvalidPerson {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The underlying store failed or timed out.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },
}

impl DtrError {
    /// Creates a storage error from any displayable cause.
    pub fn storage(message: impl Into<String>) -> Self {
        DtrError::Storage {
            message: message.into(),
        }
    }

    /// Returns true for the not-found family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DtrError::TokenNotFound { .. }
                | DtrError::PersonNotFound { .. }
                | DtrError::EventNotFound { .. }
        )
    }
}

impl From<rusqlite::Error> for DtrError {
    fn from(error: rusqlite::Error) -> Self {
        DtrError::Storage {
            message: error.to_string(),
        }
    }
}

/// A type alias for Results that return DtrError.
pub type DtrResult<T> = Result<T, DtrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = DtrError::ConfigNotFound {
            path: "/missing/dtr.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/dtr.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = DtrError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_person_not_found_displays_id() {
        let error = DtrError::PersonNotFound {
            person_id: PersonId(42),
        };
        assert_eq!(error.to_string(), "Person not found: 42");
    }

    #[test]
    fn test_event_already_closed_displays_id() {
        let error = DtrError::EventAlreadyClosed {
            event_id: EventId(7),
        };
        assert_eq!(error.to_string(), "Attendance event 7 is already closed");
    }

    #[test]
    fn test_invalid_person_displays_field_and_message() {
        let error = DtrError::InvalidPerson {
            field: "hourly_rate".to_string(),
            message: "must not be negative".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid person field 'hourly_rate': must not be negative"
        );
    }

    #[test]
    fn test_storage_helper_builds_storage_variant() {
        let error = DtrError::storage("database is locked");
        assert_eq!(error.to_string(), "Storage error: database is locked");
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_not_found_family() {
        assert!(
            DtrError::TokenNotFound {
                token: "x".to_string()
            }
            .is_not_found()
        );
        assert!(
            DtrError::EventNotFound {
                event_id: EventId(1)
            }
            .is_not_found()
        );
        assert!(
            !DtrError::EventAlreadyClosed {
                event_id: EventId(1)
            }
            .is_not_found()
        );
    }

    #[test]
    fn test_rusqlite_error_maps_to_storage() {
        let error: DtrError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(error, DtrError::Storage { .. }));
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<DtrError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_storage_error() -> DtrResult<()> {
            Err(DtrError::storage("disk full"))
        }

        fn propagates_error() -> DtrResult<()> {
            returns_storage_error()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
