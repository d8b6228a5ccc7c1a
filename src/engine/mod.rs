//! Attendance rules: time parsing, per-record classification against a
//! shift, monthly aggregation and the payroll arithmetic built on it.
//! Everything here is pure and synchronous.

pub mod calendar;
pub mod classify;
pub mod payroll;
pub mod record;
pub mod rules;
pub mod summary;
pub mod time;

pub use classify::{AttendanceStatus, Classification, classify};
pub use record::{AttendanceRecord, ShiftWindow};
pub use rules::AttendanceRules;
pub use summary::{MonthlySummary, summarize, summarize_employee};
pub use time::{ClockTime, TimeError, format_time, parse_time};
