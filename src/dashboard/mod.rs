//! The dashboard: aggregated views of transactions over a selectable period.
//!
//! This module contains:
//! - Period selection (today/week/month/year/custom date range)
//! - Pure aggregation functions (totals, category breakdowns, daily trend,
//!   monthly comparison)
//! - ECharts chart generation via `charming`
//! - The dashboard page handler and the JSON data endpoint

mod aggregation;
mod api;
mod charts;
mod handlers;
mod period;
mod tables;

pub use api::get_dashboard_data_api;
pub use handlers::get_dashboard_page;
pub use period::Period;
