use dataco_core::profile::{on_time_by, profile_dataset, DEFAULT_GROUP_COLUMN};
use dataco_core::PipelineError;
use polars::prelude::*;

fn orders() -> PolarsResult<DataFrame> {
    df!(
        "customer_country" => ["Puerto Rico", "EE. UU.", "EE. UU.", "Puerto Rico", "EE. UU.", "Mexico"],
        "late_delivery_risk" => [0i64, 1, 1, 0, 0, 1],
        "benefit_per_order" => [Some(91.25), None, Some(22.86), None, None, Some(1.0)]
    )
}

#[test]
fn profile_counts_rows_and_nulls() -> PolarsResult<()> {
    let profile = profile_dataset(&orders()?);

    assert_eq!(profile.rows, 6);
    assert_eq!(profile.columns.len(), 3);
    assert_eq!(profile.columns[2].name, "benefit_per_order");
    assert_eq!(profile.columns[2].null_count, 3);
    assert_eq!(profile.columns[0].dtype, DataType::String.to_string());

    let top = profile.most_nulls(1);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].name, "benefit_per_order");
    Ok(())
}

#[test]
fn most_nulls_keeps_schema_order_on_ties() -> PolarsResult<()> {
    let profile = profile_dataset(&orders()?);

    let names: Vec<&str> = profile
        .most_nulls(10)
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["benefit_per_order", "customer_country", "late_delivery_risk"]
    );
    Ok(())
}

#[test]
fn breakdown_puts_worst_groups_first() -> Result<(), PipelineError> {
    let breakdown = on_time_by(&orders()?, DEFAULT_GROUP_COLUMN)?;

    assert_eq!(breakdown.height(), 3);
    let countries: Vec<Option<&str>> = breakdown
        .column(DEFAULT_GROUP_COLUMN)?
        .str()?
        .into_iter()
        .collect();
    assert_eq!(
        countries,
        vec![Some("Mexico"), Some("EE. UU."), Some("Puerto Rico")]
    );

    let otd: Vec<Option<f64>> = breakdown.column("otd_rate")?.f64()?.into_iter().collect();
    assert_eq!(otd[0], Some(0.0));
    assert!((otd[1].unwrap_or_default() - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(otd[2], Some(1.0));

    let order_counts = breakdown.column("orders")?.cast(&DataType::UInt64)?;
    let counts: Vec<Option<u64>> = order_counts.u64()?.into_iter().collect();
    assert_eq!(counts, vec![Some(1), Some(3), Some(2)]);
    Ok(())
}

#[test]
fn breakdown_needs_both_columns() -> PolarsResult<()> {
    let df = orders()?;

    assert!(matches!(
        on_time_by(&df, "order_region"),
        Err(PipelineError::MissingColumn(name)) if name == "order_region"
    ));

    let without_risk = df.drop("late_delivery_risk")?;
    assert!(matches!(
        on_time_by(&without_risk, DEFAULT_GROUP_COLUMN),
        Err(PipelineError::MissingColumn(_))
    ));
    Ok(())
}
