use crate::model::{JobTableRow, MilestoneCompletion};
use batch_run_model::{JobRun, JobStatus};

/// The runs laid out as table rows in start order, optionally limited to one status.
pub fn job_table(runs: &[JobRun], status_filter: Option<&JobStatus>) -> Vec<JobTableRow> {
    let mut rows = runs
        .iter()
        .filter(|run| status_filter.is_none_or(|status| &run.status == status))
        .collect::<Vec<_>>();
    rows.sort_by_key(|run| run.start_time);

    rows.into_iter()
        .map(|run| JobTableRow {
            job_name: run.job_name.clone(),
            start_date: run.start_time.date(),
            start_time: run.start_time.time(),
            end_date: run.end_time.map(|end| end.date()),
            end_time: run.end_time.map(|end| end.time()),
            duration_minutes: run.duration_minutes(),
            status: run.status.clone(),
            message: run.message.clone(),
        })
        .collect()
}

/// Latest completion of `job_name`, if it has finished.
pub fn milestone_completion(runs: &[JobRun], job_name: &str) -> Option<MilestoneCompletion> {
    runs.iter()
        .filter(|run| run.job_name == job_name)
        .filter_map(|run| Some((run, run.end_time?)))
        .max_by_key(|(_, end)| *end)
        .map(|(run, completion_time)| MilestoneCompletion {
            job_name: run.job_name.clone(),
            completion_time,
            status: run.status.clone(),
        })
}
