//! Reporting core for the road-safety education dashboard.
//!
//! Loads backend exports (schools, public entities, events, budgets,
//! accidents, market share, priority rows) and turns them into chart series,
//! a priority matrix and next-month district recommendations. All
//! aggregation is pure and synchronous; only loading and writing touch the
//! filesystem.

pub mod charts;
pub mod config;
pub mod district;
pub mod error;
pub mod loader;
pub mod logging;
pub mod output;
pub mod priority;
pub mod recommend;
pub mod reports;
pub mod types;
pub mod util;

pub use config::AppConfig;
pub use error::{ReportError, Result};
pub use loader::{load_dataset, Dataset, LoadReport};
pub use reports::{build_dashboard, DashboardSummary};
