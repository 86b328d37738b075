//! Payroll report models.
//!
//! This module contains the [`PayrollReport`] type and its rows, plus the
//! flat [`PayrollRecord`] form used by tabular exports. Both views come from
//! the same rows, so the interactive report and the export cannot disagree.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::{PersonId, ReportRange};

/// Column headings of the tabular payroll export.
pub const PAYROLL_EXPORT_HEADER: [&str; 6] =
    ["PersonID", "Name", "Role", "Rate/hr", "TotalHours", "Pay"];

/// Hours and pay for one person over a report range.
///
/// # Example
///
/// ```
/// use dtr_payroll::models::{PayrollRow, PersonId};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let row = PayrollRow {
///     person_id: PersonId(1),
///     name: "Ana Reyes".to_string(),
///     role: "Instructor".to_string(),
///     hourly_rate: Decimal::from_str("100").unwrap(),
///     total_hours: Decimal::from_str("4.5").unwrap(),
///     pay: Decimal::from_str("450").unwrap(),
/// };
/// assert_eq!(row.pay, row.total_hours * row.hourly_rate);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRow {
    /// The person this row pays.
    pub person_id: PersonId,
    /// The person's display name.
    pub name: String,
    /// The person's role.
    pub role: String,
    /// Pay per worked hour.
    pub hourly_rate: Decimal,
    /// Worked hours, rounded to the nearest quarter hour.
    pub total_hours: Decimal,
    /// `total_hours * hourly_rate`.
    pub pay: Decimal,
}

/// Per-person payroll figures over a range, with their grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollReport {
    /// The range the report covers.
    pub range: ReportRange,
    /// One row per listed person, ordered by person id.
    pub rows: Vec<PayrollRow>,
    /// Sum of every row's pay.
    pub grand_total: Decimal,
}

impl PayrollReport {
    /// Returns the row for a person, if the person was listed.
    pub fn row(&self, person_id: PersonId) -> Option<&PayrollRow> {
        self.rows.iter().find(|row| row.person_id == person_id)
    }

    /// Sum of every row's rounded hours.
    pub fn total_hours(&self) -> Decimal {
        self.rows.iter().map(|row| row.total_hours).sum()
    }

    /// Flattens the report into export records, one per row.
    pub fn to_records(&self) -> Vec<PayrollRecord> {
        self.rows.iter().map(PayrollRecord::from).collect()
    }
}

/// One row of the tabular payroll export, every field already rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// The person's id.
    pub person_id: String,
    /// The person's display name.
    pub name: String,
    /// The person's role.
    pub role: String,
    /// Hourly rate to two decimal places.
    pub rate: String,
    /// Rounded hours to two decimal places.
    pub total_hours: String,
    /// Pay to two decimal places.
    pub pay: String,
}

impl PayrollRecord {
    /// The record's fields in [`PAYROLL_EXPORT_HEADER`] order.
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.person_id,
            &self.name,
            &self.role,
            &self.rate,
            &self.total_hours,
            &self.pay,
        ]
    }
}

impl From<&PayrollRow> for PayrollRecord {
    fn from(row: &PayrollRow) -> Self {
        Self {
            person_id: row.person_id.to_string(),
            name: row.name.clone(),
            role: row.role.clone(),
            rate: two_places(row.hourly_rate),
            total_hours: two_places(row.total_hours),
            pay: two_places(row.pay),
        }
    }
}

fn two_places(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}
