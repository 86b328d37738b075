//! Core data models for the DTR payroll core.
//!
//! This module contains the domain models shared by the attendance recorder,
//! the payroll aggregator and the stores.

mod attendance_event;
mod payroll_report;
mod person;
mod report_range;

pub use attendance_event::{AttendanceEvent, AttendanceState, EventId, ScanAction, ScanOutcome, ScanReceipt};
pub use payroll_report::{PAYROLL_EXPORT_HEADER, PayrollRecord, PayrollReport, PayrollRow};
pub use person::{NewPerson, Person, PersonId, RosterFilter, generate_token};
pub use report_range::{REPORT_DATE_FORMAT, ReportRange};
