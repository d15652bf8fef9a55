use crate::calendar::BusinessCalendar;
use crate::model::FailureTrendEntry;
use batch_run_model::JobRun;
use itertools::Itertools;
use std::collections::HashSet;

/// Failed runs grouped by processing date, job, start time and message.
///
/// Jobs named in `excluded_jobs` are flagged as not failure worthy and left out entirely.
pub fn failure_trend(
    runs: &[JobRun],
    excluded_jobs: &HashSet<String>,
    calendar: &BusinessCalendar,
) -> Vec<FailureTrendEntry> {
    runs.iter()
        .filter(|run| run.is_failed() && !excluded_jobs.contains(&run.job_name))
        .counts_by(|run| {
            (
                calendar.processing_date(run.start_time),
                run.job_name.as_str(),
                run.start_time,
                run.message.as_str(),
            )
        })
        .into_iter()
        .sorted()
        .map(
            |((processing_date, job_name, start_time, message), count)| FailureTrendEntry {
                processing_date,
                job_name: job_name.to_string(),
                start_time,
                message: message.to_string(),
                count,
            },
        )
        .collect()
}
