use crate::calendar::DATE_FORMAT;
use crate::model::JobTableRow;
use polars::io::SerWriter;
use polars::prelude::*;
use std::io::Write;

const TIME_FORMAT: &str = "%H:%M:%S";

/// Lay out job table rows as a [DataFrame], with dates and times as text.
pub fn job_table_frame(rows: &[JobTableRow]) -> anyhow::Result<DataFrame> {
    let frame = df!(
        "job_name" => rows.iter().map(|r| r.job_name.as_str()).collect::<Vec<_>>(),
        "start_date" => rows.iter().map(|r| r.start_date.format(DATE_FORMAT).to_string()).collect::<Vec<_>>(),
        "start_time" => rows.iter().map(|r| r.start_time.format(TIME_FORMAT).to_string()).collect::<Vec<_>>(),
        "end_date" => rows.iter().map(|r| r.end_date.map(|d| d.format(DATE_FORMAT).to_string())).collect::<Vec<_>>(),
        "end_time" => rows.iter().map(|r| r.end_time.map(|t| t.format(TIME_FORMAT).to_string())).collect::<Vec<_>>(),
        "duration_minutes" => rows.iter().map(|r| r.duration_minutes).collect::<Vec<_>>(),
        "status" => rows.iter().map(|r| r.status.as_str()).collect::<Vec<_>>(),
        "message" => rows.iter().map(|r| r.message.as_str()).collect::<Vec<_>>(),
    )?;

    log::trace!("Job table frame: {}", frame);

    Ok(frame)
}

/// Write a frame as a JSON array of row objects.
pub fn write_frame_json<W: Write>(frame: &mut DataFrame, writer: W) -> anyhow::Result<()> {
    polars::io::json::JsonWriter::new(writer)
        .with_json_format(JsonFormat::Json)
        .finish(frame)?;

    Ok(())
}
