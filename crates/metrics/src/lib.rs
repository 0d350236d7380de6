//! Financial and inventory KPI derivation for the HK/MC retail dashboard.
//!
//! Every module here is a pure, synchronous transformation over snapshot
//! documents loaded by `retail-kpi-core`:
//! - [`rates`]: ratios, weighted blends, YoY and previous-value reconstruction
//! - [`cost_rollup`]: per-line cost aggregation against net sales
//! - [`store_class`]: profitability × momentum store quadrants
//! - [`inventory`]: stock-weeks, aging cohorts and stagnant stock
//! - [`efficiency`]: sales per selling area
//! - [`same_store`]: like-for-like store sets
//! - [`dashboard`]: assembles all of the above for one period

pub mod channel;
pub mod cost_rollup;
pub mod dashboard;
pub mod efficiency;
pub mod formatter;
pub mod inventory;
pub mod pl_summary;
pub mod rates;
pub mod sales;
pub mod same_store;
pub mod scope;
pub mod store_class;
pub mod trend;

pub use cost_rollup::{CostAnalysis, CostRollup, LineItemMetrics};
pub use dashboard::{build_report, DashboardReport};
pub use formatter::ReportFormatter;
pub use rates::{PreviousSource, Yoy};
pub use scope::PeriodScope;
