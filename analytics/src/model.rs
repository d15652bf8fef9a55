use batch_run_model::JobStatus;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusCount {
    pub status: JobStatus,
    pub count: usize,
}

/// Number of identical failures of a job on one processing date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailureTrendEntry {
    pub processing_date: NaiveDate,
    pub job_name: String,
    pub start_time: NaiveDateTime,
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AverageDuration {
    pub processing_date: NaiveDate,
    pub job_name: String,
    pub avg_duration_minutes: f64,
    /// Number of finished runs the average is taken over
    pub runs: usize,
}

/// Hours from the end of the first anchor job to the end of the second on one processing date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterJobPoint {
    pub processing_date: NaiveDate,
    pub hours: f64,
}

/// Time difference between two anchor jobs across processing dates.
///
/// A missing anchor job is reported as [InterJobDifference::NoData] rather than as an empty
/// series, so that callers can tell "nothing to compare" apart from "no difference".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterJobDifference {
    NoData { missing_jobs: Vec<String> },
    Series { points: Vec<InterJobPoint> },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DailyDifference {
    Hours(f64),
    NoData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterJobRow {
    pub processing_date: NaiveDate,
    pub hours: f64,
    /// Set on the row for the date the report was requested for
    pub highlighted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobPerformance {
    pub job_name: String,
    /// Not set when none of the job's runs have finished
    pub avg_duration_minutes: Option<f64>,
    pub success_rate_percent: f64,
    pub frequency: usize,
}

/// Distribution of run durations, in minutes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DurationStats {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub within_std: f64,
    pub within_2std: f64,
    pub within_3std: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DurationAnomaly {
    pub job_name: String,
    pub processing_date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub status: JobStatus,
    pub duration_minutes: f64,
    pub z_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnomalyReport {
    /// Not set when there are no finished runs
    pub stats: Option<DurationStats>,
    pub anomalies: Vec<DurationAnomaly>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecoveryTime {
    pub processing_date: NaiveDate,
    pub avg_recovery_hours: f64,
    /// Number of failed runs the average is taken over
    pub failures: usize,
}

/// A job run laid out for tabular display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobTableRow {
    pub job_name: String,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: Option<f64>,
    pub status: JobStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MilestoneCompletion {
    pub job_name: String,
    pub completion_time: NaiveDateTime,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageDuration {
    pub processing_date: NaiveDate,
    pub job_name: String,
    pub start_time: NaiveDateTime,
    pub duration_minutes: f64,
}
