use crate::calendar::BusinessCalendar;
use crate::metrics::hours_between;
use crate::model::{DailyDifference, InterJobDifference, InterJobPoint, InterJobRow};
use batch_run_model::JobRun;
use chrono::NaiveDate;
use itertools::Itertools;

/// Hours between the end of `start_job` and the end of `end_job` on each processing date.
///
/// Every pair of finished runs of the two jobs that share a processing date yields one point.
pub fn inter_job_time_difference(
    runs: &[JobRun],
    start_job: &str,
    end_job: &str,
    calendar: &BusinessCalendar,
) -> InterJobDifference {
    let of_job = |name: &str| {
        runs.iter()
            .filter(|run| run.job_name == name)
            .collect::<Vec<_>>()
    };
    let start_runs = of_job(start_job);
    let end_runs = of_job(end_job);

    let missing_jobs = [(start_job, &start_runs), (end_job, &end_runs)]
        .into_iter()
        .filter(|(_, runs)| runs.is_empty())
        .map(|(name, _)| name.to_string())
        .collect::<Vec<_>>();
    if !missing_jobs.is_empty() {
        log::debug!("No runs for anchor jobs {missing_jobs:?}");
        return InterJobDifference::NoData { missing_jobs };
    }

    let finished_by_date = |runs: &[&JobRun]| {
        runs.iter()
            .filter_map(|run| Some((calendar.processing_date(run.start_time), run.end_time?)))
            .into_group_map()
    };
    let end_by_date = finished_by_date(end_runs.as_slice());

    let points = finished_by_date(start_runs.as_slice())
        .into_iter()
        .filter_map(|(date, start_ends)| Some((date, start_ends, end_by_date.get(&date)?)))
        .flat_map(|(processing_date, start_ends, end_ends)| {
            start_ends
                .into_iter()
                .cartesian_product(end_ends.iter().copied())
                .map(move |(from, to)| InterJobPoint {
                    processing_date,
                    hours: hours_between(from, to),
                })
        })
        .sorted_by(|a, b| {
            b.processing_date
                .cmp(&a.processing_date)
                .then_with(|| a.hours.total_cmp(&b.hours))
        })
        .collect();

    InterJobDifference::Series { points }
}

impl InterJobDifference {
    /// The difference on one processing date, taking the first point when there are several.
    pub fn on(&self, date: NaiveDate) -> DailyDifference {
        match self {
            InterJobDifference::NoData { .. } => DailyDifference::NoData,
            InterJobDifference::Series { points } => points
                .iter()
                .find(|point| point.processing_date == date)
                .map_or(DailyDifference::NoData, |point| {
                    DailyDifference::Hours(point.hours)
                }),
        }
    }

    pub fn points(&self) -> &[InterJobPoint] {
        match self {
            InterJobDifference::NoData { .. } => &[],
            InterJobDifference::Series { points } => points,
        }
    }
}

/// Keep the points that fall on `business_days`, highlighting the one for `selected`.
pub fn business_day_rows(
    difference: &InterJobDifference,
    business_days: &[NaiveDate],
    selected: NaiveDate,
) -> Vec<InterJobRow> {
    difference
        .points()
        .iter()
        .filter(|point| business_days.contains(&point.processing_date))
        .map(|point| InterJobRow {
            processing_date: point.processing_date,
            hours: point.hours,
            highlighted: point.processing_date == selected,
        })
        .collect()
}
