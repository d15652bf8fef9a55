use crate::calendar::BusinessCalendar;
use crate::model::StageDuration;
use batch_run_model::JobRun;
use itertools::Itertools;
use std::cmp::Ordering;

/// The leading number of a pipeline job name, `18` for `"18. TRIAD"`.
pub fn stage_number(job_name: &str) -> Option<u32> {
    let digits = job_name
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>();
    digits.parse().ok()
}

/// Order job names by their pipeline position.
///
/// Numbered jobs sort by number and come before unnumbered ones. Ties fall back to the name.
pub fn pipeline_order(a: &str, b: &str) -> Ordering {
    match (stage_number(a), stage_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Durations of every finished run whose job lies between `first` and `last` in the pipeline.
pub fn stage_durations(
    runs: &[JobRun],
    first: &str,
    last: &str,
    calendar: &BusinessCalendar,
) -> Vec<StageDuration> {
    let in_range = |name: &str| {
        pipeline_order(name, first) != Ordering::Less
            && pipeline_order(name, last) != Ordering::Greater
    };

    runs.iter()
        .filter(|run| in_range(&run.job_name))
        .filter_map(|run| {
            Some(StageDuration {
                processing_date: calendar.processing_date(run.start_time),
                job_name: run.job_name.clone(),
                start_time: run.start_time,
                duration_minutes: run.duration_minutes()?,
            })
        })
        .sorted_by(|a, b| {
            a.processing_date
                .cmp(&b.processing_date)
                .then_with(|| pipeline_order(&a.job_name, &b.job_name))
                .then_with(|| a.start_time.cmp(&b.start_time))
        })
        .collect()
}
