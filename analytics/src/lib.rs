//! Analytics over the history of nightly batch job runs.
//!
//! Runs are attributed to a processing date by the [calendar], fetched through a
//! [JobRunStore](query::JobRunStore) and reduced to dashboard metrics by [metrics]. The
//! [report] module ties these together for one selected date.

mod analyze;
pub mod calendar;
pub mod config;
mod error;
pub mod frame;
pub mod metrics;
pub mod model;
pub mod query;
pub mod report;

pub use config::{AnalyticsConfig, ConfigError};
pub use error::AnalyticsError;
pub use query::{JobRunStore, JsonlJobRunStore, MemoryJobRunStore, RunQuery, StoreError};
pub use report::{build_report, DashboardReport, ReportOutcome, ReportRequest};
