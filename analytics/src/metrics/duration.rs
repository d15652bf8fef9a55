use crate::calendar::{BusinessCalendar, TrailingWindow};
use crate::metrics::{mean, pipeline_order};
use crate::model::AverageDuration;
use batch_run_model::JobRun;
use itertools::Itertools;

/// Mean duration of each job per processing date, over the finished runs inside `window`.
pub fn average_duration(
    runs: &[JobRun],
    window: &TrailingWindow,
    calendar: &BusinessCalendar,
) -> Vec<AverageDuration> {
    runs.iter()
        .filter(|run| window.contains(run.start_time))
        .filter_map(|run| {
            let duration = run.duration_minutes()?;
            Some((
                (calendar.processing_date(run.start_time), run.job_name.as_str()),
                duration,
            ))
        })
        .into_group_map()
        .into_iter()
        .filter_map(|((processing_date, job_name), durations)| {
            Some(AverageDuration {
                processing_date,
                job_name: job_name.to_string(),
                avg_duration_minutes: mean(&durations)?,
                runs: durations.len(),
            })
        })
        .sorted_by(|a, b| {
            a.processing_date
                .cmp(&b.processing_date)
                .then_with(|| pipeline_order(&a.job_name, &b.job_name))
        })
        .collect()
}
