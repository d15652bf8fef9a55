use crate::calendar::{BusinessCalendar, DEFAULT_CUTOFF_HOUR, DEFAULT_PUBLISH_HOUR};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Upper bound on `trend_window_days`, roughly ten years
pub const MAX_TREND_WINDOW_DAYS: u64 = 3660;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings for the dashboard report.
///
/// Every field has a default, so an empty TOML file is a valid config:
///
/// ```toml
/// cutoff_hour = 14
/// publish_hour = 21
/// trend_window_days = 30
/// duration_window_months = 6
/// business_days = 5
/// excluded_failure_jobs = ["20. Benchmark Update"]
/// milestone_job = "UnLock Online"
///
/// [anchor_jobs]
/// start = "18. TRIAD"
/// end = "20. Benchmark Update"
///
/// [pipeline_stages]
/// first = "1. Lockbox KEF"
/// last = "18. TRIAD"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Runs starting before this hour belong to the previous processing date
    pub cutoff_hour: u32,
    /// Hour from which the current day's batch is considered complete
    pub publish_hour: u32,
    pub trend_window_days: u64,
    pub duration_window_months: u32,
    /// Number of business days shown in the inter-job table
    pub business_days: usize,
    pub anchor_jobs: AnchorJobs,
    /// Jobs whose failures are expected and left out of the failure trend
    pub excluded_failure_jobs: Vec<String>,
    pub milestone_job: String,
    pub pipeline_stages: PipelineStages,
}

/// The two jobs the inter-job time difference is measured between
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorJobs {
    pub start: String,
    pub end: String,
}

impl Default for AnchorJobs {
    fn default() -> Self {
        Self {
            start: "18. TRIAD".to_string(),
            end: "20. Benchmark Update".to_string(),
        }
    }
}

/// Inclusive range of pipeline stages reported by stage durations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStages {
    pub first: String,
    pub last: String,
}

impl Default for PipelineStages {
    fn default() -> Self {
        Self {
            first: "1. Lockbox KEF".to_string(),
            last: "18. TRIAD".to_string(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            cutoff_hour: DEFAULT_CUTOFF_HOUR,
            publish_hour: DEFAULT_PUBLISH_HOUR,
            trend_window_days: 30,
            duration_window_months: 6,
            business_days: 5,
            anchor_jobs: AnchorJobs::default(),
            excluded_failure_jobs: vec!["20. Benchmark Update".to_string()],
            milestone_job: "UnLock Online".to_string(),
            pipeline_stages: PipelineStages::default(),
        }
    }
}

impl AnalyticsConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded config from {:?}", path.as_ref());
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cutoff_hour >= 24 {
            return Err(ConfigError::Invalid(format!(
                "cutoff_hour must be below 24, got {}",
                self.cutoff_hour
            )));
        }
        if self.publish_hour >= 24 {
            return Err(ConfigError::Invalid(format!(
                "publish_hour must be below 24, got {}",
                self.publish_hour
            )));
        }
        if self.business_days == 0 {
            return Err(ConfigError::Invalid(
                "business_days must be at least 1".to_string(),
            ));
        }
        if self.trend_window_days == 0 || self.trend_window_days > MAX_TREND_WINDOW_DAYS {
            return Err(ConfigError::Invalid(format!(
                "trend_window_days must be between 1 and {MAX_TREND_WINDOW_DAYS}, got {}",
                self.trend_window_days
            )));
        }
        // Inter-job rows come from the trend window, so more business days than that show nothing
        if self.business_days as u64 > self.trend_window_days {
            return Err(ConfigError::Invalid(format!(
                "business_days must not exceed trend_window_days ({}), got {}",
                self.trend_window_days, self.business_days
            )));
        }
        Ok(())
    }

    pub fn calendar(&self) -> BusinessCalendar {
        BusinessCalendar::new(self.cutoff_hour, self.publish_hour)
    }

    pub fn excluded_failure_jobs(&self) -> HashSet<String> {
        self.excluded_failure_jobs.iter().cloned().collect()
    }
}
