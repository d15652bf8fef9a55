use std::path::PathBuf;

use batch_run_model::JobStatus;
use chrono::{NaiveDate, NaiveDateTime};
use clap::Parser;

#[derive(Parser)]
#[command(about, long_about = None)]
pub struct CliArgs {
    /// Path to the job run history in JSON lines format.
    #[arg(long, env = "JOB_RUNS_PATH", default_value = "job_runs.jsonl")]
    pub job_runs: PathBuf,

    /// Path to a TOML config file. Defaults are used for anything not set.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Processing date to report on, as YYYY-MM-DD. Defaults to the last business day.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Current time as YYYY-MM-DDTHH:MM:SS. Defaults to the local time.
    #[arg(long, value_parser = parse_now)]
    pub now: Option<NaiveDateTime>,

    /// Only include runs with this status in the job table.
    #[arg(long)]
    pub status: Option<String>,

    /// Skip job runs that cannot be parsed instead of failing.
    #[arg(long)]
    pub allow_invalid_entries: bool,

    /// Directory to write the report to.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Also write the day's job table as a JSON data frame to this path.
    #[arg(long)]
    pub job_table: Option<PathBuf>,
}

impl CliArgs {
    pub fn status_filter(&self) -> Option<JobStatus> {
        self.status.as_deref().map(JobStatus::from)
    }
}

fn parse_date(input: &str) -> Result<NaiveDate, batch_analytics::AnalyticsError> {
    batch_analytics::calendar::parse_selected_date(input)
}

fn parse_now(input: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(input.trim(), "%Y-%m-%dT%H:%M:%S")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates() {
        let args = CliArgs::try_parse_from([
            "batch-analytics",
            "--date",
            "2024-03-04",
            "--now",
            "2024-03-05T22:00:00",
            "--status",
            "Failed",
        ])
        .unwrap();

        assert_eq!(NaiveDate::from_ymd_opt(2024, 3, 4), args.date);
        assert_eq!(Some(JobStatus::Failed), args.status_filter());
        assert!(!args.allow_invalid_entries);
    }

    #[test]
    fn rejects_bad_date() {
        assert!(CliArgs::try_parse_from(["batch-analytics", "--date", "03/04/2024"]).is_err());
    }
}
