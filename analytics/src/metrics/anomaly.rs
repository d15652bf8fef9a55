use crate::analyze::duration_stats;
use crate::calendar::BusinessCalendar;
use crate::model::{AnomalyReport, DurationAnomaly};
use batch_run_model::JobRun;

/// Runs whose duration is at least this many standard deviations from the mean are anomalies
pub const ANOMALY_Z_THRESHOLD: f64 = 2.0;

// Absorbs float noise so that a z-score landing exactly on the threshold is flagged.
const EPSILON: f64 = 1e-9;

/// Flag finished runs whose duration is far from the mean of all finished runs.
///
/// The statistics are computed over every job together. When there are fewer than two durations,
/// or when they are all the same, nothing is flagged.
pub fn detect_anomalies(
    runs: &[JobRun],
    calendar: &BusinessCalendar,
) -> anyhow::Result<AnomalyReport> {
    let finished = runs
        .iter()
        .filter_map(|run| Some((run, run.duration_minutes()?)))
        .collect::<Vec<_>>();
    let durations = finished.iter().map(|(_, d)| *d).collect::<Vec<_>>();

    let Some(stats) = duration_stats(&durations)? else {
        return Ok(AnomalyReport::default());
    };

    if stats.samples < 2 || stats.std <= EPSILON * stats.mean.abs().max(1.0) {
        log::debug!("Not enough spread in {} durations to flag anomalies", stats.samples);
        return Ok(AnomalyReport {
            stats: Some(stats),
            anomalies: Vec::new(),
        });
    }

    let anomalies = finished
        .into_iter()
        .filter_map(|(run, duration_minutes)| {
            let z_score = (duration_minutes - stats.mean) / stats.std;
            (z_score.abs() >= ANOMALY_Z_THRESHOLD - EPSILON).then(|| DurationAnomaly {
                job_name: run.job_name.clone(),
                processing_date: calendar.processing_date(run.start_time),
                start_time: run.start_time,
                status: run.status.clone(),
                duration_minutes,
                z_score,
            })
        })
        .collect::<Vec<_>>();

    log::debug!(
        "Flagged {} of {} durations as anomalies",
        anomalies.len(),
        stats.samples
    );

    Ok(AnomalyReport {
        stats: Some(stats),
        anomalies,
    })
}
