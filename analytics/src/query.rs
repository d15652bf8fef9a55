use crate::calendar::{BusinessCalendar, TrailingWindow};
use batch_run_model::{JobRun, JsonlError, JsonlReader};
use chrono::{NaiveDate, NaiveDateTime};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::PathBuf;
use thiserror::Error;

/// Selects the runs a metric needs from a [JobRunStore]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunQuery {
    /// Runs that belong to `date`, which are exactly those starting in `[start, end)`
    ProcessingDate {
        date: NaiveDate,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Runs that started inside the window
    Trailing(TrailingWindow),
}

impl RunQuery {
    /// Runs of the processing date `date`, as a start time range a store can filter on directly.
    pub fn processing_date(calendar: &BusinessCalendar, date: NaiveDate) -> Self {
        let (start, end) = calendar.processing_window(date);
        RunQuery::ProcessingDate { date, start, end }
    }

    pub fn matches(&self, run: &JobRun) -> bool {
        match self {
            RunQuery::ProcessingDate { start, end, .. } => {
                *start <= run.start_time && run.start_time < *end
            }
            RunQuery::Trailing(window) => window.contains(run.start_time),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read job runs from {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse job runs from {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: JsonlError,
    },
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

pub type StoreFuture<'a> = BoxFuture<'a, Result<Vec<JobRun>, StoreError>>;

/// Source of job run history.
///
/// Implementations return every run the query matches, in any order.
pub trait JobRunStore: Send + Sync {
    fn fetch_runs(&self, query: RunQuery) -> StoreFuture<'_>;
}

/// Reads the whole JSONL history file on every query and filters it in memory.
#[derive(Debug, Clone)]
pub struct JsonlJobRunStore {
    path: PathBuf,
    allow_invalid_entries: bool,
}

impl JsonlJobRunStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            allow_invalid_entries: false,
        }
    }

    /// Skip records that fail to parse or validate instead of failing the query
    pub fn allow_invalid_entries(mut self, allow: bool) -> Self {
        self.allow_invalid_entries = allow;
        self
    }

    async fn read_all(&self) -> Result<Vec<JobRun>, StoreError> {
        let content = tokio::fs::read(&self.path)
            .await
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;

        JsonlReader::new(self.allow_invalid_entries)
            .parse(content.as_slice())
            .map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })
    }
}

impl JobRunStore for JsonlJobRunStore {
    fn fetch_runs(&self, query: RunQuery) -> StoreFuture<'_> {
        async move {
            log::debug!("Querying: {:?} from {:?}", query, self.path);

            let runs = self
                .read_all()
                .await?
                .into_iter()
                .filter(|run| query.matches(run))
                .collect::<Vec<_>>();

            log::trace!("Loaded {} runs for {:?}", runs.len(), query);
            Ok(runs)
        }
        .boxed()
    }
}

/// Holds runs in memory, mostly useful for tests and for callers that already loaded the data.
#[derive(Debug, Clone, Default)]
pub struct MemoryJobRunStore {
    runs: Vec<JobRun>,
}

impl MemoryJobRunStore {
    pub fn new(runs: Vec<JobRun>) -> Self {
        Self { runs }
    }
}

impl JobRunStore for MemoryJobRunStore {
    fn fetch_runs(&self, query: RunQuery) -> StoreFuture<'_> {
        log::debug!("Querying: {:?}", query);

        let runs = self
            .runs
            .iter()
            .filter(|run| query.matches(run))
            .cloned()
            .collect();
        futures::future::ready(Ok(runs)).boxed()
    }
}
