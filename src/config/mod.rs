//! Configuration loading and management for the DTR payroll core.
//!
//! This module provides functionality to load storage, clock and payroll
//! settings from a YAML file. The loaded configuration is injected into the
//! stores and services; nothing reads it from global state.
//!
//! # Example
//!
//! ```no_run
//! use dtr_payroll::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/dtr.yaml").unwrap();
//! println!("Busy timeout: {}ms", config.config().storage.busy_timeout_ms);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{ClockConfig, DtrConfig, PayrollConfig, StorageConfig};
