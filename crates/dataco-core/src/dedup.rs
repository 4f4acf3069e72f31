use polars::prelude::*;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Deduplicated {
    pub df: DataFrame,
    pub removed: usize,
}

/// Drops rows equal to an earlier row in every column, keeping the first
/// occurrence and the order of the survivors. Nulls compare equal.
pub fn deduplicate(df: DataFrame) -> PolarsResult<Deduplicated> {
    let before = df.height();
    if before == 0 || df.width() == 0 {
        return Ok(Deduplicated { df, removed: 0 });
    }

    let df = df
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;
    let removed = before - df.height();

    if removed > 0 {
        info!(removed, remaining = df.height(), "removed duplicate rows");
    }

    Ok(Deduplicated { df, removed })
}
