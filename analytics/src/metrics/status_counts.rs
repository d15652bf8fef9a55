use crate::model::StatusCount;
use batch_run_model::JobRun;
use itertools::Itertools;

/// Count the runs for each distinct status, most frequent first.
pub fn status_counts(runs: &[JobRun]) -> Vec<StatusCount> {
    runs.iter()
        .counts_by(|run| run.status.clone())
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .sorted_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.status.as_str().cmp(b.status.as_str()))
        })
        .collect()
}
