//! Person model and related types.
//!
//! This module defines the [`Person`] record that the identity store
//! resolves tokens to, the [`NewPerson`] registration input and the
//! [`RosterFilter`] used when listing persons for a report.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DtrError, DtrResult};

/// Opaque identifier of a registered person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which persons a roster listing includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterFilter {
    /// Every registered person, active or not.
    #[default]
    All,
    /// Only persons whose `active` flag is set.
    ActiveOnly,
}

impl RosterFilter {
    /// Returns true if the person passes this filter.
    pub fn includes(self, person: &Person) -> bool {
        match self {
            RosterFilter::All => true,
            RosterFilter::ActiveOnly => person.active,
        }
    }
}

/// A registered person whose scans are recorded and who is paid by the hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier for the person.
    pub id: PersonId,
    /// Display name.
    pub name: String,
    /// Role or position (e.g., "Instructor").
    pub role: String,
    /// Pay per worked hour.
    pub hourly_rate: Decimal,
    /// Whether the person is currently on the active roster.
    pub active: bool,
    /// Opaque token embedded in the person's scannable code.
    pub token: String,
}

/// Registration input for a new person.
///
/// The store assigns the id and token; new persons start active.
///
/// # Example
///
/// ```
/// use dtr_payroll::models::NewPerson;
/// use rust_decimal::Decimal;
///
/// let person = NewPerson::new("Ana Reyes", "Instructor", Decimal::new(150, 0));
/// assert!(person.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    /// Display name.
    pub name: String,
    /// Role or position.
    pub role: String,
    /// Pay per worked hour.
    pub hourly_rate: Decimal,
}

impl NewPerson {
    /// Creates a registration record.
    pub fn new(name: impl Into<String>, role: impl Into<String>, hourly_rate: Decimal) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            hourly_rate,
        }
    }

    /// Checks the record before it reaches a store.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPerson` if the name is blank or the hourly rate is
    /// negative.
    pub fn validate(&self) -> DtrResult<()> {
        if self.name.trim().is_empty() {
            return Err(DtrError::InvalidPerson {
                field: "name".to_string(),
                message: "must not be blank".to_string(),
            });
        }
        if self.hourly_rate < Decimal::ZERO {
            return Err(DtrError::InvalidPerson {
                field: "hourly_rate".to_string(),
                message: format!("must not be negative, got {}", self.hourly_rate),
            });
        }
        Ok(())
    }

    /// Builds the stored person from this record.
    pub fn into_person(self, id: PersonId, token: String) -> Person {
        Person {
            id,
            name: self.name,
            role: self.role,
            hourly_rate: self.hourly_rate,
            active: true,
            token,
        }
    }
}

/// Generates a fresh person token.
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
