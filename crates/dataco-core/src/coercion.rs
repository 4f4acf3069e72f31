use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

/// Columns whose canonical name contains this token are tried as dates.
pub const DATE_TOKEN: &str = "date";

pub fn is_date_like(name: &str) -> bool {
    name.contains(DATE_TOKEN)
}

#[derive(Debug, Clone, Copy)]
enum FormatKind {
    DateTime,
    Date,
    Rfc3339,
}

#[derive(Debug, Clone, Copy)]
struct DateFormat {
    pattern: &'static str,
    kind: FormatKind,
}

impl DateFormat {
    const fn new(pattern: &'static str, kind: FormatKind) -> Self {
        Self { pattern, kind }
    }

    fn parse(&self, value: &str) -> Option<NaiveDateTime> {
        match self.kind {
            FormatKind::DateTime => NaiveDateTime::parse_from_str(value, self.pattern).ok(),
            FormatKind::Date => NaiveDate::parse_from_str(value, self.pattern)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0)),
            FormatKind::Rfc3339 => DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc()),
        }
    }
}

// Month-first for slashed dates, matching the DataCo export.
static FORMATS: &[DateFormat] = &[
    DateFormat::new("%Y-%m-%d %H:%M:%S%.f", FormatKind::DateTime),
    DateFormat::new("%Y-%m-%d %H:%M:%S", FormatKind::DateTime),
    DateFormat::new("%Y-%m-%dT%H:%M:%S%.f", FormatKind::DateTime),
    DateFormat::new("%Y-%m-%dT%H:%M:%S", FormatKind::DateTime),
    DateFormat::new("%Y-%m-%d %H:%M", FormatKind::DateTime),
    DateFormat::new("%Y-%m-%dT%H:%M", FormatKind::DateTime),
    DateFormat::new("rfc3339", FormatKind::Rfc3339),
    DateFormat::new("%m/%d/%Y %H:%M:%S", FormatKind::DateTime),
    DateFormat::new("%m/%d/%Y %H:%M", FormatKind::DateTime),
    DateFormat::new("%Y/%m/%d %H:%M:%S", FormatKind::DateTime),
    DateFormat::new("%Y/%m/%d %H:%M", FormatKind::DateTime),
    DateFormat::new("%d-%b-%Y %H:%M:%S", FormatKind::DateTime),
    DateFormat::new("%Y-%m-%d", FormatKind::Date),
    DateFormat::new("%m/%d/%Y", FormatKind::Date),
    DateFormat::new("%Y/%m/%d", FormatKind::Date),
    DateFormat::new("%d-%b-%Y", FormatKind::Date),
    DateFormat::new("%d %b %Y", FormatKind::Date),
    DateFormat::new("%b %d %Y", FormatKind::Date),
];

fn detect_format(value: &str) -> Option<&'static DateFormat> {
    FORMATS.iter().find(|format| format.parse(value).is_some())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoercionFailure {
    NotText {
        dtype: String,
    },
    UnrecognizedFormat {
        value: String,
    },
    InconsistentValue {
        row: usize,
        value: String,
        format: &'static str,
    },
    Cast {
        message: String,
    },
}

impl fmt::Display for CoercionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercionFailure::NotText { dtype } => write!(f, "column is {dtype}, not text"),
            CoercionFailure::UnrecognizedFormat { value } => {
                write!(f, "'{value}' does not match any known date format")
            }
            CoercionFailure::InconsistentValue { row, value, format } => {
                write!(f, "row {row} value '{value}' does not match format '{format}'")
            }
            CoercionFailure::Cast { message } => write!(f, "datetime cast failed: {message}"),
        }
    }
}

/// A date-like column that stayed as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnCoercionWarning {
    pub column: String,
    pub reason: CoercionFailure,
}

impl fmt::Display for ColumnCoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not convert '{}' to datetime: {}", self.column, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CoercionOutcome {
    /// `format` is `None` when the column held no values at all.
    Parsed { format: Option<&'static str> },
    AlreadyTemporal,
    Failed(ColumnCoercionWarning),
}

#[derive(Debug, Clone)]
pub struct Coercion {
    pub values: Option<Series>,
    pub outcome: CoercionOutcome,
}

impl Coercion {
    fn failed(name: &str, reason: CoercionFailure) -> Self {
        Self {
            values: None,
            outcome: CoercionOutcome::Failed(ColumnCoercionWarning {
                column: name.to_string(),
                reason,
            }),
        }
    }
}

/// Tries to turn one column into `Datetime(µs)`.
///
/// The format is taken from the first non-empty value and every other value
/// must match it; a single miss leaves the whole column alone. Never fails:
/// problems come back as [`CoercionOutcome::Failed`].
pub fn coerce_column(name: &str, column: &Column) -> Coercion {
    match column.dtype() {
        DataType::Datetime(_, _) | DataType::Date => {
            return Coercion {
                values: None,
                outcome: CoercionOutcome::AlreadyTemporal,
            }
        }
        DataType::String => {}
        other => {
            return Coercion::failed(
                name,
                CoercionFailure::NotText {
                    dtype: other.to_string(),
                },
            )
        }
    }

    let text = match column.str() {
        Ok(text) => text,
        Err(err) => {
            return Coercion::failed(
                name,
                CoercionFailure::Cast {
                    message: err.to_string(),
                },
            )
        }
    };

    let (micros, format) = match parse_text(text) {
        Ok(parsed) => parsed,
        Err(reason) => return Coercion::failed(name, reason),
    };

    match Series::new(name.into(), micros).cast(&DataType::Datetime(TimeUnit::Microseconds, None)) {
        Ok(series) => Coercion {
            values: Some(series),
            outcome: CoercionOutcome::Parsed { format },
        },
        Err(err) => Coercion::failed(
            name,
            CoercionFailure::Cast {
                message: err.to_string(),
            },
        ),
    }
}

fn parse_text(
    text: &StringChunked,
) -> Result<(Vec<Option<i64>>, Option<&'static str>), CoercionFailure> {
    let mut format: Option<&'static DateFormat> = None;
    let mut micros = Vec::with_capacity(text.len());

    for (row, value) in text.into_iter().enumerate() {
        let trimmed = match value.map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => {
                micros.push(None);
                continue;
            }
        };

        let active = match format {
            Some(active) => active,
            None => {
                let detected = detect_format(trimmed).ok_or_else(|| {
                    CoercionFailure::UnrecognizedFormat {
                        value: trimmed.to_string(),
                    }
                })?;
                format = Some(detected);
                detected
            }
        };

        let parsed = active
            .parse(trimmed)
            .ok_or_else(|| CoercionFailure::InconsistentValue {
                row,
                value: trimmed.to_string(),
                format: active.pattern,
            })?;
        micros.push(Some(parsed.and_utc().timestamp_micros()));
    }

    Ok((micros, format.map(|f| f.pattern)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnCoercion {
    pub column: String,
    pub outcome: CoercionOutcome,
}

#[derive(Debug, Clone)]
pub struct CoercedFrame {
    pub df: DataFrame,
    pub coercions: Vec<ColumnCoercion>,
}

impl CoercedFrame {
    pub fn warnings(&self) -> impl Iterator<Item = &ColumnCoercionWarning> {
        self.coercions.iter().filter_map(|c| match &c.outcome {
            CoercionOutcome::Failed(warning) => Some(warning),
            _ => None,
        })
    }
}

/// Applies [`coerce_column`] to every date-like column, in place.
pub fn coerce_date_columns(mut df: DataFrame) -> PolarsResult<CoercedFrame> {
    let candidates: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .filter(|name| is_date_like(name))
        .collect();

    let mut coercions = Vec::with_capacity(candidates.len());
    for name in candidates {
        let coercion = coerce_column(&name, df.column(&name)?);

        if let Some(values) = coercion.values {
            df.with_column(values)?;
        }

        match &coercion.outcome {
            CoercionOutcome::Parsed { format } => {
                info!(column = %name, format = format.unwrap_or("none"), "parsed date column");
            }
            CoercionOutcome::AlreadyTemporal => {}
            CoercionOutcome::Failed(warning) => {
                warn!(column = %name, reason = %warning.reason, "could not convert column to datetime");
            }
        }

        coercions.push(ColumnCoercion {
            column: name,
            outcome: coercion.outcome,
        });
    }

    Ok(CoercedFrame { df, coercions })
}
