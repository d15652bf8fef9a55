use crate::model::DurationStats;
use anyhow::Context;
use polars::prelude::*;

const DURATION_COLUMN: &str = "duration_minutes";

/// Population statistics over a set of durations.
///
/// Returns [None] when there are no durations to describe.
pub(crate) fn duration_stats(durations: &[f64]) -> anyhow::Result<Option<DurationStats>> {
    if durations.is_empty() {
        return Ok(None);
    }

    let frame = df!(DURATION_COLUMN => durations)?;

    let moments = frame
        .clone()
        .lazy()
        .select([
            col(DURATION_COLUMN).mean().alias("mean"),
            col(DURATION_COLUMN).std(0).alias("std"),
        ])
        .collect()?;

    let mean = moments
        .column("mean")?
        .f64()?
        .get(0)
        .context("Mean")?;
    let std = moments.column("std")?.f64()?.get(0).unwrap_or(0.0);

    let out = frame
        .lazy()
        .select([
            within(DURATION_COLUMN, mean, std, 1.0).alias("within_std"),
            within(DURATION_COLUMN, mean, std, 2.0).alias("within_2std"),
            within(DURATION_COLUMN, mean, std, 3.0).alias("within_3std"),
        ])
        .collect()?;

    Ok(Some(DurationStats {
        mean,
        std,
        within_std: share(&out, "within_std")?,
        within_2std: share(&out, "within_2std")?,
        within_3std: share(&out, "within_3std")?,
        samples: durations.len(),
    }))
}

/// Fraction of values within `k` standard deviations of the mean
fn within(column: &str, mean: f64, std: f64, k: f64) -> Expr {
    col(column)
        .gt_eq(lit(mean - k * std))
        .and(col(column).lt_eq(lit(mean + k * std)))
        .cast(DataType::Float64)
        .mean()
}

fn share(frame: &DataFrame, column: &str) -> anyhow::Result<f64> {
    frame
        .column(column)?
        .f64()?
        .get(0)
        .with_context(|| format!("Missing {column}"))
}
