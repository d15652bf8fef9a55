use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

mod jsonl;

pub use jsonl::{
    append_job_run, load_job_run, load_job_runs, store_job_run, JsonlError, JsonlReader,
};

/// Status of a job run as reported by the batch scheduler.
///
/// The set of statuses is open. Only [JobStatus::Failed] gets special treatment by the analytics,
/// every other status counts as a success.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Succeeded,
    SucceededWithExceptions,
    Failed,
    /// Any status text the scheduler reports that is not one of the known ones
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Succeeded => "Succeeded",
            JobStatus::SucceededWithExceptions => "Succeeded with Exceptions",
            JobStatus::Failed => "Failed",
            JobStatus::Other(status) => status,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, JobStatus::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Succeeded" => JobStatus::Succeeded,
            "Succeeded with Exceptions" | "SucceededWithExceptions" => {
                JobStatus::SucceededWithExceptions
            }
            "Failed" => JobStatus::Failed,
            _ => JobStatus::Other(value),
        }
    }
}

impl From<&str> for JobStatus {
    fn from(value: &str) -> Self {
        JobStatus::from(value.to_string())
    }
}

impl From<JobStatus> for String {
    fn from(value: JobStatus) -> Self {
        match value {
            JobStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single historical execution of a named job step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRun {
    /// The job name
    ///
    /// Names usually carry a numeric prefix that gives the position of the job in the pipeline,
    /// for example `18. TRIAD`.
    pub job_name: String,
    /// When the run started, in the reference timezone of the batch
    pub start_time: NaiveDateTime,
    /// When the run ended, in the reference timezone of the batch
    ///
    /// Not set while the job is still running.
    pub end_time: Option<NaiveDateTime>,
    /// The final status of the run
    pub status: JobStatus,
    /// Free text diagnostic from the scheduler
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunValidationError {
    #[error("Job run has an empty job name")]
    EmptyJobName,
    #[error("Job run for {job_name} ends at {end_time} before it starts at {start_time}")]
    EndBeforeStart {
        job_name: String,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    },
}

impl JobRun {
    /// Create a new job run
    pub fn new(
        job_name: impl Into<String>,
        start_time: NaiveDateTime,
        end_time: Option<NaiveDateTime>,
        status: impl Into<JobStatus>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            start_time,
            end_time,
            status: status.into(),
            message: message.into(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status.is_failed()
    }

    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    /// Duration of the run in minutes.
    ///
    /// Runs without an end time, or with an end time before the start time, have no duration.
    pub fn duration_minutes(&self) -> Option<f64> {
        let end_time = self.end_time?;
        if end_time < self.start_time {
            return None;
        }

        Some((end_time - self.start_time).num_milliseconds() as f64 / 60_000.0)
    }

    /// Check the invariants of a job run record
    pub fn validate(&self) -> Result<(), RunValidationError> {
        if self.job_name.trim().is_empty() {
            return Err(RunValidationError::EmptyJobName);
        }

        match self.end_time {
            Some(end_time) if end_time < self.start_time => {
                Err(RunValidationError::EndBeforeStart {
                    job_name: self.job_name.clone(),
                    start_time: self.start_time,
                    end_time,
                })
            }
            _ => Ok(()),
        }
    }
}
