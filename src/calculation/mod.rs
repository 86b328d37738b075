//! Calculation logic for the DTR payroll core.
//!
//! This module contains the pure payroll functions: summing worked time
//! from attendance events, rounding hours to the quarter hour, and building
//! per-person payroll rows with their grand total.

mod payroll_aggregation;
mod quarter_hour;
mod worked_hours;

pub use payroll_aggregation::build_payroll_report;
pub use quarter_hour::{QUARTER_HOUR, is_quarter_hour_multiple, round_to_quarter_hour};
pub use worked_hours::{duration_to_hours, total_worked_duration};
