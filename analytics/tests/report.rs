use batch_analytics::calendar::{IneligibleReason, TrailingWindow};
use batch_analytics::metrics::detect_anomalies;
use batch_analytics::model::{DailyDifference, StatusCount};
use batch_analytics::query::StoreFuture;
use batch_analytics::{
    build_report, AnalyticsConfig, AnalyticsError, DashboardReport, JobRunStore,
    JsonlJobRunStore, MemoryJobRunStore, ReportOutcome, ReportRequest, RunQuery, StoreError,
};
use batch_run_model::{JobRun, JobStatus};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_data/job_runs.jsonl")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, hour: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(hour, min, 0).unwrap()
}

async fn ready_report(selected_date: NaiveDate, now: NaiveDateTime) -> DashboardReport {
    let outcome = build_report(
        &JsonlJobRunStore::new(fixture()),
        &AnalyticsConfig::default(),
        &ReportRequest::new(selected_date, now),
    )
    .await
    .unwrap();

    match outcome {
        ReportOutcome::Ready(report) => *report,
        other => panic!("Expected a ready report, got {other:?}"),
    }
}

/// Counts queries so tests can check whether the store was touched
#[derive(Default)]
struct CountingStore {
    inner: MemoryJobRunStore,
    queries: AtomicUsize,
}

impl JobRunStore for CountingStore {
    fn fetch_runs(&self, query: RunQuery) -> StoreFuture<'_> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_runs(query)
    }
}

#[tokio::test]
async fn status_counts_for_the_selected_day() {
    let report = ready_report(date(2024, 3, 5), at(2024, 3, 6, 22, 0)).await;

    assert_eq!(
        vec![
            StatusCount {
                status: JobStatus::Succeeded,
                count: 6,
            },
            StatusCount {
                status: JobStatus::Failed,
                count: 1,
            },
        ],
        report.status_counts
    );
    assert_eq!(7, report.job_table.len());
}

#[tokio::test]
async fn inter_job_difference_between_anchor_jobs() {
    let report = ready_report(date(2024, 3, 5), at(2024, 3, 6, 22, 0)).await;

    assert_eq!(
        DailyDifference::Hours(3.5),
        report.inter_job.on(date(2024, 3, 5))
    );
    assert_eq!(
        DailyDifference::Hours(2.5),
        report.inter_job.on(date(2024, 3, 4))
    );
    assert_eq!(
        DailyDifference::NoData,
        report.inter_job.on(date(2024, 3, 1))
    );

    let rows = report
        .inter_job_business_days
        .iter()
        .map(|row| (row.processing_date, row.highlighted))
        .collect::<Vec<_>>();
    assert_eq!(
        vec![(date(2024, 3, 5), true), (date(2024, 3, 4), false)],
        rows
    );
}

#[tokio::test]
async fn excluded_jobs_are_not_failure_trends() {
    let report = ready_report(date(2024, 3, 5), at(2024, 3, 6, 22, 0)).await;

    assert_eq!(1, report.failure_trend.len());
    assert_eq!("3. Billing", report.failure_trend[0].job_name);
    assert_eq!("Deadlock detected", report.failure_trend[0].message);
}

#[tokio::test]
async fn milestone_and_online_availability() {
    let report = ready_report(date(2024, 3, 5), at(2024, 3, 6, 22, 0)).await;

    assert_eq!(
        Some(at(2024, 3, 6, 5, 42)),
        report.milestone.map(|m| m.completion_time)
    );
    assert_eq!(Some(at(2024, 3, 6, 5, 30)), report.online_availability);
    assert_eq!(8, report.stage_durations.len());
}

#[tokio::test]
async fn weekend_does_not_query_the_store() {
    let store = CountingStore::default();

    let outcome = build_report(
        &store,
        &AnalyticsConfig::default(),
        &ReportRequest::new(date(2024, 3, 9), at(2024, 3, 11, 22, 0)),
    )
    .await
    .unwrap();

    assert!(matches!(
        outcome,
        ReportOutcome::Ineligible {
            reason: IneligibleReason::Weekend,
            ..
        }
    ));
    assert_eq!(0, store.queries.load(Ordering::SeqCst));
}

#[tokio::test]
async fn today_before_publish_is_pending() {
    let store = CountingStore::default();

    let outcome = build_report(
        &store,
        &AnalyticsConfig::default(),
        &ReportRequest::new(date(2024, 3, 6), at(2024, 3, 6, 20, 59)),
    )
    .await
    .unwrap();

    assert!(matches!(
        outcome,
        ReportOutcome::Ineligible {
            reason: IneligibleReason::BatchPending,
            ..
        }
    ));
    assert_eq!(0, store.queries.load(Ordering::SeqCst));
}

#[tokio::test]
async fn eligible_date_queries_three_record_sets() {
    let store = CountingStore::default();

    let outcome = build_report(
        &store,
        &AnalyticsConfig::default(),
        &ReportRequest::new(date(2024, 3, 1), at(2024, 3, 6, 22, 0)),
    )
    .await
    .unwrap();

    assert_eq!(
        ReportOutcome::NoData {
            selected_date: date(2024, 3, 1)
        },
        outcome
    );
    assert_eq!(3, store.queries.load(Ordering::SeqCst));
}

#[tokio::test]
async fn missing_history_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();

    let err = build_report(
        &JsonlJobRunStore::new(dir.path().join("job_runs.jsonl")),
        &AnalyticsConfig::default(),
        &ReportRequest::new(date(2024, 3, 5), at(2024, 3, 6, 22, 0)),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        AnalyticsError::DataSourceUnavailable(StoreError::Read { .. })
    ));
}

#[tokio::test]
async fn invalid_entries_can_be_skipped() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&std::fs::read(fixture()).unwrap()).unwrap();
    writeln!(file, "{{\"job_name\": \"broken\"").unwrap();
    file.flush().unwrap();

    let request = ReportRequest::new(date(2024, 3, 5), at(2024, 3, 6, 22, 0));

    let err = build_report(
        &JsonlJobRunStore::new(file.path()),
        &AnalyticsConfig::default(),
        &request,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        AnalyticsError::DataSourceUnavailable(StoreError::Parse { .. })
    ));

    let outcome = build_report(
        &JsonlJobRunStore::new(file.path()).allow_invalid_entries(true),
        &AnalyticsConfig::default(),
        &request,
    )
    .await
    .unwrap();
    assert!(matches!(outcome, ReportOutcome::Ready(_)));
}

#[test]
fn long_run_is_an_anomaly() {
    let start = at(2024, 3, 4, 22, 0);
    let runs = [10, 10, 10, 10, 100]
        .into_iter()
        .enumerate()
        .map(|(i, minutes)| {
            let start = start + TimeDelta::days(i as i64);
            JobRun::new(
                "3. Billing",
                start,
                Some(start + TimeDelta::minutes(minutes)),
                "Succeeded",
                "",
            )
        })
        .collect::<Vec<_>>();

    let report = detect_anomalies(&runs, &AnalyticsConfig::default().calendar()).unwrap();

    assert_eq!(1, report.anomalies.len());
    assert_eq!(100.0, report.anomalies[0].duration_minutes);
}

#[tokio::test]
async fn trailing_window_excludes_old_runs() {
    let store = JsonlJobRunStore::new(fixture());
    let window = TrailingWindow::days(at(2024, 3, 6, 12, 0), 1);

    let runs = store.fetch_runs(RunQuery::Trailing(window)).await.unwrap();

    assert!(runs.iter().all(|run| window.contains(run.start_time)));
    assert_eq!(7, runs.len());
}
