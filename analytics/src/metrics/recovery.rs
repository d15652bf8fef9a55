use crate::calendar::BusinessCalendar;
use crate::metrics::{hours_between, mean};
use crate::model::RecoveryTime;
use batch_run_model::JobRun;
use itertools::Itertools;

/// Average hours between a failed run's end and the previous end of the same job, per
/// processing date.
///
/// Only finished runs take part. The first finished run of a job has nothing to recover from.
pub fn recovery_time(runs: &[JobRun], calendar: &BusinessCalendar) -> Vec<RecoveryTime> {
    runs.iter()
        .filter(|run| run.end_time.is_some())
        .into_group_map_by(|run| run.job_name.as_str())
        .into_values()
        .flat_map(|job_runs| {
            job_runs
                .into_iter()
                .sorted_by_key(|run| run.end_time)
                .tuple_windows()
                .filter(|(_, current)| current.is_failed())
                .filter_map(|(previous, current)| {
                    Some((
                        calendar.processing_date(current.start_time),
                        hours_between(previous.end_time?, current.end_time?),
                    ))
                })
                .collect::<Vec<_>>()
        })
        .into_group_map()
        .into_iter()
        .filter_map(|(processing_date, hours)| {
            Some(RecoveryTime {
                processing_date,
                avg_recovery_hours: mean(&hours)?,
                failures: hours.len(),
            })
        })
        .sorted_by_key(|recovery| recovery.processing_date)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{at, date, run};
    use pretty_assertions::assert_eq;

    #[test]
    fn hours_since_previous_completion() {
        let runs = vec![
            run("3. Billing", at(4, 22, 0), Some(at(4, 23, 0)), "Succeeded"),
            run("3. Billing", at(5, 22, 0), Some(at(5, 23, 0)), "Failed"),
            run("5. GL Post", at(5, 20, 0), Some(at(5, 21, 0)), "Succeeded"),
            run("5. GL Post", at(5, 22, 0), Some(at(6, 1, 0)), "Failed"),
        ];

        assert_eq!(
            vec![RecoveryTime {
                processing_date: date(5),
                avg_recovery_hours: 14.0,
                failures: 2,
            }],
            recovery_time(&runs, &BusinessCalendar::default())
        );
    }

    #[test]
    fn first_failure_has_no_recovery() {
        let runs = vec![
            run("3. Billing", at(4, 22, 0), Some(at(4, 23, 0)), "Failed"),
            run("3. Billing", at(5, 22, 0), None, "Failed"),
        ];

        assert!(recovery_time(&runs, &BusinessCalendar::default()).is_empty());
    }

    #[test]
    fn ordered_by_date() {
        let runs = vec![
            run("3. Billing", at(1, 22, 0), Some(at(1, 23, 0)), "Succeeded"),
            run("3. Billing", at(7, 22, 0), Some(at(7, 23, 0)), "Failed"),
            run("3. Billing", at(4, 22, 0), Some(at(4, 23, 0)), "Failed"),
        ];

        let dates = recovery_time(&runs, &BusinessCalendar::default())
            .into_iter()
            .map(|r| (r.processing_date, r.avg_recovery_hours))
            .collect::<Vec<_>>();
        assert_eq!(vec![(date(4), 72.0), (date(7), 72.0)], dates);
    }
}
