use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiName {
    OtdRate,
    OtifRate,
    LateRate,
    LeadTimeRealAvg,
    LeadTimeDelayAvg,
}

impl KpiName {
    pub const ALL: [KpiName; 5] = [
        KpiName::OtdRate,
        KpiName::OtifRate,
        KpiName::LateRate,
        KpiName::LeadTimeRealAvg,
        KpiName::LeadTimeDelayAvg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KpiName::OtdRate => "otd_rate",
            KpiName::OtifRate => "otif_rate",
            KpiName::LateRate => "late_rate",
            KpiName::LeadTimeRealAvg => "lead_time_real_avg",
            KpiName::LeadTimeDelayAvg => "lead_time_delay_avg",
        }
    }
}

impl fmt::Display for KpiName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type KpiResult = BTreeMap<KpiName, f64>;

/// A source field a KPI needs, recognized by the first matching candidate name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    LateDeliveryRisk,
    ActualShippingDays,
    ScheduledShippingDays,
}

impl LogicalField {
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            LogicalField::LateDeliveryRisk => &["late_delivery_risk"],
            LogicalField::ActualShippingDays => &[
                "days_for_shipping_real",
                "days_for_shipment_actual",
                "lead_time_real",
            ],
            LogicalField::ScheduledShippingDays => &[
                "days_for_shipment_scheduled",
                "days_for_shipping_scheduled",
            ],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LogicalField::LateDeliveryRisk => "late delivery risk",
            LogicalField::ActualShippingDays => "actual shipping days",
            LogicalField::ScheduledShippingDays => "scheduled shipping days",
        }
    }
}

pub fn find_column(df: &DataFrame, field: LogicalField) -> Option<&'static str> {
    field
        .candidates()
        .iter()
        .copied()
        .find(|name| df.column(name).is_ok())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KpiWarning {
    MissingColumn {
        field: LogicalField,
        tried: &'static [&'static str],
    },
    Unusable {
        field: LogicalField,
        column: String,
        reason: String,
    },
}

impl fmt::Display for KpiWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiWarning::MissingColumn { field, tried } => write!(
                f,
                "no {} column found (tried: {})",
                field.description(),
                tried.join(", ")
            ),
            KpiWarning::Unusable {
                field,
                column,
                reason,
            } => write!(
                f,
                "{} column '{column}' cannot be used: {reason}",
                field.description()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupOutcome {
    Available(Vec<(KpiName, f64)>),
    Unavailable(KpiWarning),
}

/// `late_rate` is the mean of the 0/1 risk flag; OTD and OTIF are its
/// complement (the dataset has no separate in-full signal).
pub fn late_delivery_kpis(df: &DataFrame) -> GroupOutcome {
    let late = match numeric_column(df, LogicalField::LateDeliveryRisk)
        .and_then(|(name, values)| mean_of(LogicalField::LateDeliveryRisk, name, &values))
    {
        Ok(mean) => mean,
        Err(warning) => return GroupOutcome::Unavailable(warning),
    };

    let on_time = 1.0 - late;
    GroupOutcome::Available(vec![
        (KpiName::OtdRate, on_time),
        (KpiName::OtifRate, on_time),
        (KpiName::LateRate, late),
    ])
}

pub fn lead_time_real_kpis(df: &DataFrame) -> GroupOutcome {
    match numeric_column(df, LogicalField::ActualShippingDays)
        .and_then(|(name, values)| mean_of(LogicalField::ActualShippingDays, name, &values))
    {
        Ok(mean) => GroupOutcome::Available(vec![(KpiName::LeadTimeRealAvg, mean)]),
        Err(warning) => GroupOutcome::Unavailable(warning),
    }
}

/// Mean of the per-row `actual - scheduled` difference. A row missing either
/// side drops out of the mean, so this can differ from the difference of the
/// two column means when nulls are not aligned.
pub fn lead_time_delay_kpis(df: &DataFrame) -> GroupOutcome {
    let (actual_name, actual) = match numeric_column(df, LogicalField::ActualShippingDays) {
        Ok(found) => found,
        Err(warning) => return GroupOutcome::Unavailable(warning),
    };
    let (scheduled_name, scheduled) = match numeric_column(df, LogicalField::ScheduledShippingDays)
    {
        Ok(found) => found,
        Err(warning) => return GroupOutcome::Unavailable(warning),
    };

    let delay = &actual - &scheduled;
    match delay.mean() {
        Some(mean) => GroupOutcome::Available(vec![(KpiName::LeadTimeDelayAvg, mean)]),
        None => GroupOutcome::Unavailable(KpiWarning::Unusable {
            field: LogicalField::ScheduledShippingDays,
            column: format!("{actual_name} - {scheduled_name}"),
            reason: "no row has both values".to_string(),
        }),
    }
}

fn numeric_column(
    df: &DataFrame,
    field: LogicalField,
) -> std::result::Result<(&'static str, Float64Chunked), KpiWarning> {
    let name = find_column(df, field).ok_or(KpiWarning::MissingColumn {
        field,
        tried: field.candidates(),
    })?;
    let unusable = |reason: String| KpiWarning::Unusable {
        field,
        column: name.to_string(),
        reason,
    };

    let column = df.column(name).map_err(|err| unusable(err.to_string()))?;
    if !is_numeric(column.dtype()) {
        return Err(unusable(format!(
            "expected a numeric column, found {}",
            column.dtype()
        )));
    }

    let cast = column
        .cast(&DataType::Float64)
        .map_err(|err| unusable(err.to_string()))?;
    let values = cast.f64().map_err(|err| unusable(err.to_string()))?.clone();
    Ok((name, values))
}

fn mean_of(
    field: LogicalField,
    name: &str,
    values: &Float64Chunked,
) -> std::result::Result<f64, KpiWarning> {
    values.mean().ok_or_else(|| KpiWarning::Unusable {
        field,
        column: name.to_string(),
        reason: "column has no values".to_string(),
    })
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Boolean
            | DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Computed KPIs plus the reasons any group was left out. An empty `kpis`
/// map means nothing was computable, which is not an error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KpiReport {
    pub kpis: KpiResult,
    pub warnings: Vec<KpiWarning>,
}

impl KpiReport {
    pub fn is_empty(&self) -> bool {
        self.kpis.is_empty()
    }

    pub fn get(&self, name: KpiName) -> Option<f64> {
        self.kpis.get(&name).copied()
    }
}

/// Runs every KPI group over `df` and merges the ones that are available.
pub fn compute_kpis(df: &DataFrame) -> KpiReport {
    let groups = [
        late_delivery_kpis(df),
        lead_time_real_kpis(df),
        lead_time_delay_kpis(df),
    ];

    let mut report = KpiReport::default();
    for outcome in groups {
        match outcome {
            GroupOutcome::Available(values) => report.kpis.extend(values),
            GroupOutcome::Unavailable(warning) => {
                warn!(warning = %warning, "KPI group skipped");
                if !report.warnings.contains(&warning) {
                    report.warnings.push(warning);
                }
            }
        }
    }

    if report.is_empty() {
        info!("dataset cannot supply any KPI");
    }
    report
}

/// Loads the processed dataset and computes KPIs from what is on disk.
pub struct KpiEngine<'a> {
    config: &'a PipelineConfig,
}

impl<'a> KpiEngine<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// `location` defaults to the configured processed path.
    pub fn load(&self, location: Option<&Path>) -> Result<DataFrame> {
        let path = location
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.processed_path());
        let df = storage::read_parquet(&path)?;
        info!(path = %path.display(), rows = df.height(), columns = df.width(), "processed dataset loaded");
        Ok(df)
    }

    pub fn compute_all_kpis(&self, location: Option<&Path>) -> Result<KpiReport> {
        let df = self.load(location)?;
        Ok(compute_kpis(&df))
    }
}

/// One line of the KPI listing: the name padded to 25 columns, then the value
/// with a sign slot and three decimals.
pub fn format_kpi_line(name: KpiName, value: f64) -> String {
    let sign = if value.is_sign_negative() { '-' } else { ' ' };
    format!("{:<25}: {sign}{:.3}", name.as_str(), value.abs())
}
