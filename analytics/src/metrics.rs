//! Pure metric computations over job runs.
//!
//! Every function takes the record set it works on as a parameter and derives a new value from
//! it. Processing dates are always resolved through the [BusinessCalendar], never taken from the
//! raw start time.
//!
//! [BusinessCalendar]: crate::calendar::BusinessCalendar

use chrono::NaiveDateTime;

mod anomaly;
mod duration;
mod failure_trend;
mod inter_job;
mod job_table;
mod performance;
mod recovery;
mod stages;
mod status_counts;

pub use anomaly::{detect_anomalies, ANOMALY_Z_THRESHOLD};
pub use duration::average_duration;
pub use failure_trend::failure_trend;
pub use inter_job::{business_day_rows, inter_job_time_difference};
pub use job_table::{job_table, milestone_completion};
pub use performance::performance_summary;
pub use recovery::recovery_time;
pub use stages::{pipeline_order, stage_durations, stage_number};
pub use status_counts::status_counts;

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Signed hours from `from` to `to`
pub(crate) fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
pub(crate) mod test_support {
    use batch_run_model::JobRun;
    use chrono::{NaiveDate, NaiveDateTime};

    pub fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    pub fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    pub fn run(
        job_name: &str,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        status: &str,
    ) -> JobRun {
        JobRun::new(job_name, start, end, status, "")
    }

    /// A finished run of `minutes` starting at `start`
    pub fn run_for(job_name: &str, start: NaiveDateTime, minutes: i64, status: &str) -> JobRun {
        run(
            job_name,
            start,
            Some(start + chrono::TimeDelta::minutes(minutes)),
            status,
        )
    }
}
