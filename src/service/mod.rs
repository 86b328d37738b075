//! Services over the stores: the attendance recorder and payroll reporting.
//!
//! Both services share their stores and clock through `Arc`, so one
//! instance of each can serve every request worker. [`DtrState`] wires them
//! up from a loaded configuration.

mod attendance;
mod clock;
mod payroll;
mod state;

pub use attendance::AttendanceRecorder;
pub use clock::{Clock, ManualClock, SystemClock};
pub use payroll::PayrollService;
pub use state::DtrState;
