use crate::metrics::{mean, pipeline_order};
use crate::model::JobPerformance;
use batch_run_model::JobRun;
use itertools::Itertools;

/// Average duration, success rate and run count of every job that ran.
///
/// A run counts as a success unless its status is `Failed`.
pub fn performance_summary(runs: &[JobRun]) -> Vec<JobPerformance> {
    runs.iter()
        .into_group_map_by(|run| run.job_name.as_str())
        .into_iter()
        .map(|(job_name, job_runs)| {
            let durations = job_runs
                .iter()
                .filter_map(|run| run.duration_minutes())
                .collect::<Vec<_>>();
            let successes = job_runs.iter().filter(|run| !run.is_failed()).count();

            JobPerformance {
                job_name: job_name.to_string(),
                avg_duration_minutes: mean(&durations),
                success_rate_percent: successes as f64 / job_runs.len() as f64 * 100.0,
                frequency: job_runs.len(),
            }
        })
        .sorted_by(|a, b| pipeline_order(&a.job_name, &b.job_name))
        .collect()
}
