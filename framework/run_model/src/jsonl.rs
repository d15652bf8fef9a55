use crate::{JobRun, RunValidationError};
use std::io::{BufRead, Read, Write};
use std::path::PathBuf;

/// Reader for job runs stored as JSON Lines, one [JobRun] per line.
#[derive(Debug, Default)]
pub struct JsonlReader {
    /// Whether to skip entries that fail to parse or validate instead of failing the whole read.
    pub allow_invalid_entries: bool,
}

impl JsonlReader {
    pub fn new(allow_invalid_entries: bool) -> Self {
        Self {
            allow_invalid_entries,
        }
    }

    /// Parses job runs from the given reader.
    ///
    /// Blank lines are ignored. Every parsed run is checked with [JobRun::validate].
    pub fn parse<R>(&self, reader: R) -> Result<Vec<JobRun>, JsonlError>
    where
        R: Read,
    {
        let mut runs = Vec::new();
        for (index, line) in std::io::BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let line_number = index + 1;
            let run = match serde_json::from_str::<JobRun>(&line) {
                Ok(run) => run,
                Err(e) if self.allow_invalid_entries => {
                    log::warn!("Skipping unparseable job run on line {line_number}: {e}");
                    continue;
                }
                Err(source) => {
                    return Err(JsonlError::Serde {
                        line: line_number,
                        source,
                    })
                }
            };

            match run.validate() {
                Ok(()) => runs.push(run),
                Err(e) if self.allow_invalid_entries => {
                    log::warn!("Skipping invalid job run on line {line_number}: {e}");
                }
                Err(source) => {
                    return Err(JsonlError::Invalid {
                        line: line_number,
                        source,
                    })
                }
            }
        }

        Ok(runs)
    }

    /// Parses job runs from the file at `path`.
    pub fn parse_from_file<P>(&self, path: P) -> Result<Vec<JobRun>, JsonlError>
    where
        P: AsRef<std::path::Path>,
    {
        let file = std::fs::File::open(path)?;
        self.parse(file)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed job run on line {line}")]
    Serde {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid job run on line {line}")]
    Invalid {
        line: usize,
        #[source]
        source: RunValidationError,
    },
}

/// Append a job run to a file
///
/// The run is serialized to JSON and written as a single line followed by a newline. The
/// recommended file extension is `.jsonl`.
pub fn append_job_run(run: &JobRun, path: PathBuf) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    store_job_run(run, &mut file)?;
    file.write_all("\n".as_bytes())?;
    Ok(())
}

/// Serialize a job run to a writer
pub fn store_job_run<W: Write>(run: &JobRun, writer: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer(writer, run)?;
    Ok(())
}

/// Load a single job run from a reader
pub fn load_job_run<R: Read>(reader: R) -> anyhow::Result<JobRun> {
    let reader = std::io::BufReader::new(reader);
    let run: JobRun = serde_json::from_reader(reader)?;
    run.validate()?;
    Ok(run)
}

/// Load job runs from a file
///
/// The file should contain one JSON object per line. This is the format produced by
/// [append_job_run]. Any malformed or invalid line fails the load.
pub fn load_job_runs(path: PathBuf) -> anyhow::Result<Vec<JobRun>> {
    Ok(JsonlReader::default().parse_from_file(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JobStatus;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const VALID: &str = r#"{"job_name":"18. TRIAD","start_time":"2024-03-04T23:10:00","end_time":"2024-03-05T02:00:00","status":"Succeeded","message":""}
{"job_name":"20. Benchmark Update","start_time":"2024-03-05T02:05:00","end_time":null,"status":"Failed","message":"Deadlock"}
"#;

    const BACKWARDS: &str = r#"{"job_name":"18. TRIAD","start_time":"2024-03-05T02:00:00","end_time":"2024-03-04T23:10:00","status":"Succeeded"}"#;

    #[test]
    fn parse_valid_lines() {
        let runs = JsonlReader::default().parse(VALID.as_bytes()).unwrap();
        assert_eq!(2, runs.len());
        assert_eq!("18. TRIAD", runs[0].job_name);
        assert_eq!(JobStatus::Failed, runs[1].status);
        assert_eq!(None, runs[1].end_time);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let input = format!("\n{VALID}\n\n");
        let runs = JsonlReader::default().parse(input.as_bytes()).unwrap();
        assert_eq!(2, runs.len());
    }

    #[test]
    fn malformed_line_fails_with_line_number() {
        let input = format!("{VALID}not json\n");
        let err = JsonlReader::default().parse(input.as_bytes()).unwrap_err();
        assert!(matches!(err, JsonlError::Serde { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn invalid_run_fails_strict_read() {
        let err = JsonlReader::default()
            .parse(BACKWARDS.as_bytes())
            .unwrap_err();
        assert!(matches!(err, JsonlError::Invalid { line: 1, .. }), "{err:?}");
    }

    #[test]
    fn lenient_reader_skips_bad_entries() {
        let input = format!("{BACKWARDS}\nnot json\n{VALID}");
        let runs = JsonlReader::new(true).parse(input.as_bytes()).unwrap();
        assert_eq!(2, runs.len());
    }

    #[test]
    fn append_then_load() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("job_runs.jsonl");

        let start = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap();
        let first = JobRun::new("1. Lockbox KEF", start, None, "Succeeded", "");
        let second = JobRun::new("2. Cash Apply", start, None, "Failed", "Timeout");

        append_job_run(&first, path.clone())?;
        append_job_run(&second, path.clone())?;

        let loaded = load_job_runs(path)?;
        assert_eq!(vec![first, second], loaded);

        Ok(())
    }

    #[test]
    fn load_single_run_validates() {
        assert!(load_job_run(BACKWARDS.as_bytes()).is_err());
    }
}
