use crate::query::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid date '{input}', expected YYYY-MM-DD")]
    InvalidDateFormat {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("Job run store unavailable")]
    DataSourceUnavailable(#[from] StoreError),
    #[error("Failed to compute {metric}")]
    Metric {
        metric: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl AnalyticsError {
    pub(crate) fn metric(metric: &'static str, source: anyhow::Error) -> Self {
        AnalyticsError::Metric {
            metric,
            source: source.into(),
        }
    }
}
