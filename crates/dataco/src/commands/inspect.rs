use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use dataco_core::profile::{on_time_by, profile_dataset};
use dataco_core::{KpiEngine, PipelineConfig};
use polars::prelude::*;

pub fn inspect(
    config: &PipelineConfig,
    path: Option<&Path>,
    group_column: &str,
    top_nulls: usize,
) -> Result<()> {
    let df = KpiEngine::new(config)
        .load(path)
        .context("failed to load processed dataset")?;

    let profile = profile_dataset(&df);
    println!("{} rows x {} columns", profile.rows, profile.columns.len());

    let mut nulls = new_table(vec!["column", "dtype", "nulls"]);
    for column in profile.most_nulls(top_nulls) {
        nulls.add_row(vec![
            Cell::new(&column.name),
            Cell::new(&column.dtype),
            Cell::new(column.null_count).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{nulls}");

    let breakdown = on_time_by(&df, group_column)
        .with_context(|| format!("failed to group on-time delivery by '{group_column}'"))?;
    println!("{}", breakdown_table(&breakdown, group_column)?);
    Ok(())
}

fn breakdown_table(breakdown: &DataFrame, group_column: &str) -> PolarsResult<Table> {
    let groups = breakdown.column(group_column)?.cast(&DataType::String)?;
    let groups = groups.str()?;
    let orders = breakdown.column("orders")?.cast(&DataType::UInt64)?;
    let orders = orders.u64()?;
    let late = breakdown.column("late_rate")?.f64()?;
    let on_time = breakdown.column("otd_rate")?.f64()?;

    let mut table = new_table(vec![group_column, "orders", "late_rate", "otd_rate"]);
    for row in 0..breakdown.height() {
        table.add_row(vec![
            Cell::new(groups.get(row).unwrap_or("(null)")),
            Cell::new(orders.get(row).unwrap_or_default()).set_alignment(CellAlignment::Right),
            rate_cell(late.get(row)),
            rate_cell(on_time.get(row)),
        ]);
    }
    Ok(table)
}

fn rate_cell(value: Option<f64>) -> Cell {
    let text = value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}
