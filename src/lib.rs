//! Daily Time Record (DTR) attendance and payroll core.
//!
//! This crate records clock-in and clock-out scans against an append-only
//! attendance log and turns that log into quarter-hour payroll reports.
//!
//! - [`service::AttendanceRecorder`] flips a person between clocked out and
//!   clocked in on every scan, serializing scans per person.
//! - [`service::PayrollService`] sums each person's worked time over a date
//!   range, rounds it to the nearest quarter hour and multiplies by the
//!   hourly rate. The tabular export is built from the same report.
//! - [`store`] defines the storage traits with in-memory and `SQLite`
//!   back-ends.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{NaiveDate, TimeDelta};
//! use dtr_payroll::models::NewPerson;
//! use dtr_payroll::service::{AttendanceRecorder, ManualClock, PayrollService};
//! use dtr_payroll::store::{InMemoryStore, Roster};
//! use rust_decimal::Decimal;
//!
//! let day = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
//! let clock = Arc::new(ManualClock::new(day.and_hms_opt(8, 0, 0).unwrap()));
//! let store = Arc::new(InMemoryStore::new());
//! let recorder = AttendanceRecorder::new(store.clone(), clock.clone());
//! let payroll = PayrollService::new(store.clone(), store.clone(), clock.clone());
//!
//! let ana = store
//!     .register_person(NewPerson::new("Ana Reyes", "Instructor", Decimal::new(100, 0)))
//!     .unwrap();
//! recorder.scan_token(store.as_ref(), &ana.token).unwrap();
//! clock.advance(TimeDelta::minutes(270));
//! recorder.scan_token(store.as_ref(), &ana.token).unwrap();
//!
//! let report = payroll.compute_report_for_dates(Some(day), Some(day)).unwrap();
//! assert_eq!(report.grand_total, Decimal::new(450, 0));
//! ```

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
