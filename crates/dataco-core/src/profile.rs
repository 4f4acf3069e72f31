use polars::prelude::*;
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::kpis::{find_column, LogicalField};

pub const DEFAULT_GROUP_COLUMN: &str = "customer_country";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: Vec<ColumnProfile>,
}

impl DatasetProfile {
    /// Columns with the most nulls first; ties keep schema order.
    pub fn most_nulls(&self, limit: usize) -> Vec<&ColumnProfile> {
        let mut sorted: Vec<&ColumnProfile> = self.columns.iter().collect();
        sorted.sort_by(|a, b| b.null_count.cmp(&a.null_count));
        sorted.truncate(limit);
        sorted
    }
}

pub fn profile_dataset(df: &DataFrame) -> DatasetProfile {
    let columns = df
        .get_columns()
        .iter()
        .map(|column| ColumnProfile {
            name: column.name().to_string(),
            dtype: column.dtype().to_string(),
            null_count: column.null_count(),
        })
        .collect();

    DatasetProfile {
        rows: df.height(),
        columns,
    }
}

/// On-time delivery per value of `group_column`: order count, `late_rate`
/// and `otd_rate`, worst groups first.
pub fn on_time_by(df: &DataFrame, group_column: &str) -> Result<DataFrame> {
    let late = find_column(df, LogicalField::LateDeliveryRisk).ok_or_else(|| {
        PipelineError::MissingColumn(LogicalField::LateDeliveryRisk.candidates().join(" | "))
    })?;
    if df.column(group_column).is_err() {
        return Err(PipelineError::MissingColumn(group_column.to_string()));
    }

    let breakdown = df
        .clone()
        .lazy()
        .group_by([col(group_column)])
        .agg([
            col(late).count().alias("orders"),
            col(late).cast(DataType::Float64).mean().alias("late_rate"),
        ])
        .with_column((lit(1.0) - col("late_rate")).alias("otd_rate"))
        .sort(["otd_rate", group_column], SortMultipleOptions::default())
        .collect()?;

    Ok(breakdown)
}
