use dataco_core::dedup::deduplicate;
use polars::prelude::*;

#[test]
fn removes_exact_duplicates_keeping_first_occurrence() -> PolarsResult<()> {
    let df = df!(
        "order_id" => [3i64, 1, 3, 2, 1],
        "customer_country" => ["Spain", "France", "Spain", "Chile", "France"],
        "late_delivery_risk" => [1i64, 0, 1, 0, 0]
    )?;

    let deduped = deduplicate(df)?;

    assert_eq!(deduped.removed, 2);
    let ids: Vec<Option<i64>> = deduped.df.column("order_id")?.i64()?.into_iter().collect();
    assert_eq!(ids, vec![Some(3), Some(1), Some(2)]);
    Ok(())
}

#[test]
fn rows_differing_in_one_column_are_kept() -> PolarsResult<()> {
    let df = df!(
        "order_id" => [1i64, 1, 1],
        "late_delivery_risk" => [0i64, 1, 0],
        "benefit" => [1.5f64, 1.5, 1.25]
    )?;

    let deduped = deduplicate(df)?;

    assert_eq!(deduped.removed, 0);
    assert_eq!(deduped.df.height(), 3);
    Ok(())
}

#[test]
fn null_values_compare_equal() -> PolarsResult<()> {
    let df = df!(
        "order_id" => [Some(1i64), Some(1), Some(2)],
        "customer_city" => [None::<&str>, None, Some("Caguas")]
    )?;

    let deduped = deduplicate(df)?;

    assert_eq!(deduped.removed, 1);
    assert_eq!(deduped.df.height(), 2);
    Ok(())
}

#[test]
fn deduplication_is_idempotent() -> PolarsResult<()> {
    let df = df!(
        "order_id" => [1i64, 2, 2, 3, 3, 3],
        "late_delivery_risk" => [0i64, 1, 1, 0, 0, 0]
    )?;

    let once = deduplicate(df)?;
    let first_pass = once.df.clone();
    let twice = deduplicate(once.df)?;

    assert_eq!(once.removed, 3);
    assert_eq!(twice.removed, 0);
    assert!(twice.df.equals_missing(&first_pass));
    Ok(())
}

#[test]
fn empty_frame_is_returned_unchanged() -> PolarsResult<()> {
    let df = df!("order_id" => Vec::<i64>::new())?;
    let deduped = deduplicate(df)?;
    assert_eq!(deduped.removed, 0);
    assert_eq!(deduped.df.height(), 0);
    Ok(())
}
