use anyhow::Context;
use batch_analytics::calendar::last_business_day;
use batch_analytics::frame::{job_table_frame, write_frame_json};
use batch_analytics::{
    build_report, AnalyticsConfig, JsonlJobRunStore, ReportOutcome, ReportRequest,
};
use chrono::Local;
use clap::Parser as _;
use log::{debug, info};
use std::fs::File;

mod cli;

const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = cli::CliArgs::try_parse()?;
    info!("{CRATE_NAME} {CRATE_VERSION}");

    let config = match &args.config {
        Some(path) => AnalyticsConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AnalyticsConfig::default(),
    };
    debug!("Using config: {:?}", config);

    let now = args.now.unwrap_or_else(|| Local::now().naive_local());
    let selected_date = args
        .date
        .unwrap_or_else(|| last_business_day(now.date()));
    info!("Reporting on {} at {}", selected_date, now);
    info!("Using job runs file: {}", args.job_runs.display());

    let store = JsonlJobRunStore::new(&args.job_runs)
        .allow_invalid_entries(args.allow_invalid_entries);
    let request = ReportRequest::new(selected_date, now).with_status_filter(args.status_filter());

    let outcome = build_report(&store, &config, &request)
        .await
        .context("Failed to build report")?;

    if let (Some(path), ReportOutcome::Ready(report)) = (&args.job_table, &outcome) {
        let mut frame = job_table_frame(&report.job_table)?;
        let out = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_frame_json(&mut frame, out).context("Failed to write job table")?;
        debug!("Wrote job table to {}", path.display());
    }

    let report_path = args.output_dir.join(format!(
        "batch-report-{}-{}.json",
        selected_date,
        Local::now().format("%Y-%m-%dT%H.%M.%S%.f")
    ));
    let report = File::create_new(&report_path)
        .with_context(|| format!("Failed to create {}", report_path.display()))?;
    serde_json::to_writer_pretty(report, &outcome)?;

    match &outcome {
        ReportOutcome::Ineligible { message, .. } => info!("{message}"),
        ReportOutcome::NoData { .. } => info!("No data available for {selected_date}"),
        ReportOutcome::Ready(_) => {}
    }
    info!("Wrote report to {}", report_path.display());

    Ok(())
}
