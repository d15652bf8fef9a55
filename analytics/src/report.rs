use crate::calendar::{last_n_business_days, Eligibility, IneligibleReason, TrailingWindow};
use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use crate::metrics::{
    average_duration, business_day_rows, detect_anomalies, failure_trend,
    inter_job_time_difference, job_table, milestone_completion, performance_summary,
    recovery_time, stage_durations, status_counts,
};
use crate::model::{
    AnomalyReport, AverageDuration, FailureTrendEntry, InterJobDifference, InterJobRow,
    JobPerformance, JobTableRow, MilestoneCompletion, RecoveryTime, StageDuration, StatusCount,
};
use crate::query::{JobRunStore, RunQuery};
use batch_run_model::{JobRun, JobStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub selected_date: NaiveDate,
    pub now: NaiveDateTime,
    /// Limits the job table to runs with this status
    pub status_filter: Option<JobStatus>,
}

impl ReportRequest {
    pub fn new(selected_date: NaiveDate, now: NaiveDateTime) -> Self {
        Self {
            selected_date,
            now,
            status_filter: None,
        }
    }

    pub fn with_status_filter(mut self, status: Option<JobStatus>) -> Self {
        self.status_filter = status;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReportOutcome {
    /// The date cannot be reported on, the store was not queried
    Ineligible {
        selected_date: NaiveDate,
        reason: IneligibleReason,
        message: String,
    },
    /// No runs resolved to the selected date
    NoData { selected_date: NaiveDate },
    Ready(Box<DashboardReport>),
}

/// Every metric for one processing date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub selected_date: NaiveDate,
    pub generated_at: NaiveDateTime,
    pub job_table: Vec<JobTableRow>,
    pub milestone: Option<MilestoneCompletion>,
    /// When the end anchor job finished on the selected date, which is when the online systems
    /// become available again
    pub online_availability: Option<NaiveDateTime>,
    pub status_counts: Vec<StatusCount>,
    pub failure_trend: Vec<FailureTrendEntry>,
    pub inter_job: InterJobDifference,
    pub inter_job_business_days: Vec<InterJobRow>,
    pub stage_durations: Vec<StageDuration>,
    pub average_duration: Vec<AverageDuration>,
    pub performance: Vec<JobPerformance>,
    pub anomalies: AnomalyReport,
    pub recovery: Vec<RecoveryTime>,
}

/// Build the dashboard report for the requested processing date.
///
/// Eligibility is checked before the store is touched. The three record sets are then fetched
/// concurrently and every metric is computed from them.
pub async fn build_report(
    store: &dyn JobRunStore,
    config: &AnalyticsConfig,
    request: &ReportRequest,
) -> Result<ReportOutcome, AnalyticsError> {
    let calendar = config.calendar();
    let selected_date = request.selected_date;

    if let Eligibility::Ineligible(reason) = calendar.eligibility(selected_date, request.now) {
        log::warn!(
            "Not reporting on {}: {} ({:?})",
            selected_date,
            reason.message(),
            reason
        );
        return Ok(ReportOutcome::Ineligible {
            selected_date,
            reason,
            message: reason.message().to_string(),
        });
    }

    let trend_window = TrailingWindow::days(request.now, config.trend_window_days);
    let duration_window = TrailingWindow::months(request.now, config.duration_window_months);

    let (day_runs, trend_runs, duration_runs) = futures::future::try_join3(
        store.fetch_runs(RunQuery::processing_date(&calendar, selected_date)),
        store.fetch_runs(RunQuery::Trailing(trend_window)),
        store.fetch_runs(RunQuery::Trailing(duration_window)),
    )
    .await?;

    log::debug!(
        "Fetched {} runs for {}, {} for the trend window and {} for the duration window",
        day_runs.len(),
        selected_date,
        trend_runs.len(),
        duration_runs.len()
    );

    if day_runs.is_empty() {
        log::info!("No job runs found for {}", selected_date);
        return Ok(ReportOutcome::NoData { selected_date });
    }

    let report = compute_dashboard(
        config,
        request,
        &day_runs,
        &trend_runs,
        &duration_runs,
        &duration_window,
    )?;

    log::info!(
        "Built report for {} from {} job runs",
        selected_date,
        day_runs.len()
    );

    Ok(ReportOutcome::Ready(Box::new(report)))
}

/// Compute every metric from record sets that have already been fetched.
pub fn compute_dashboard(
    config: &AnalyticsConfig,
    request: &ReportRequest,
    day_runs: &[JobRun],
    trend_runs: &[JobRun],
    duration_runs: &[JobRun],
    duration_window: &TrailingWindow,
) -> Result<DashboardReport, AnalyticsError> {
    let calendar = config.calendar();
    let selected_date = request.selected_date;

    log::debug!("Computing job table");
    let job_table = job_table(day_runs, request.status_filter.as_ref());
    let milestone = milestone_completion(day_runs, &config.milestone_job);
    let online_availability =
        milestone_completion(day_runs, &config.anchor_jobs.end).map(|m| m.completion_time);
    let status_counts = status_counts(day_runs);

    log::debug!("Computing failure trend");
    let failure_trend = failure_trend(
        trend_runs,
        &config.excluded_failure_jobs(),
        &calendar,
    );

    log::debug!("Computing inter-job time difference");
    let inter_job = inter_job_time_difference(
        trend_runs,
        &config.anchor_jobs.start,
        &config.anchor_jobs.end,
        &calendar,
    );
    let inter_job_business_days = business_day_rows(
        &inter_job,
        &last_n_business_days(selected_date, config.business_days),
        selected_date,
    );

    log::debug!("Computing stage durations");
    let stage_durations = stage_durations(
        trend_runs,
        &config.pipeline_stages.first,
        &config.pipeline_stages.last,
        &calendar,
    );

    log::debug!("Computing average durations");
    let average_duration = average_duration(duration_runs, duration_window, &calendar);

    log::debug!("Computing performance summary");
    let performance = performance_summary(trend_runs);

    log::debug!("Detecting anomalies");
    let anomalies = detect_anomalies(trend_runs, &calendar)
        .map_err(|e| AnalyticsError::metric("anomaly detection", e))?;

    log::debug!("Computing recovery time");
    let recovery = recovery_time(trend_runs, &calendar);

    Ok(DashboardReport {
        selected_date,
        generated_at: request.now,
        job_table,
        milestone,
        online_availability,
        status_counts,
        failure_trend,
        inter_job,
        inter_job_business_days,
        stage_durations,
        average_duration,
        performance,
        anomalies,
        recovery,
    })
}
