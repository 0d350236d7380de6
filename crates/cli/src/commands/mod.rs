//! CLI commands for the retail KPI engine.

pub mod period;
pub mod report;

pub use period::{run_period, PeriodArgs};
pub use report::{run_report, ReportArgs};
