use std::path::PathBuf;

use blake3::Hasher;
use dataco_parser::{parse_delimited, RawTable};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{error, info, info_span};
use uuid::Uuid;

use crate::coercion::{coerce_date_columns, ColumnCoercion, ColumnCoercionWarning, CoercionOutcome};
use crate::columns::{normalize_columns, ColumnRename};
use crate::config::PipelineConfig;
use crate::dedup::deduplicate;
use crate::error::Result;
use crate::fetch::{HttpSource, RawSource};
use crate::storage;

/// The canonical dataset, before it is written.
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub df: DataFrame,
    pub renamed: Vec<ColumnRename>,
    pub coercions: Vec<ColumnCoercion>,
    pub duplicates_removed: usize,
}

/// Normalizes labels, converts date-like columns and drops exact duplicate
/// rows, in that order.
pub fn clean_raw_table(raw: RawTable) -> Result<CleanedDataset> {
    let normalized = normalize_columns(raw)?;
    let coerced = coerce_date_columns(normalized.df)?;
    let deduped = deduplicate(coerced.df)?;

    Ok(CleanedDataset {
        df: deduped.df,
        renamed: normalized.renamed,
        coercions: coerced.coercions,
        duplicates_removed: deduped.removed,
    })
}

/// What a successful run did. `processed_path` is the run's output.
#[derive(Debug, Clone, Serialize)]
pub struct EtlSummary {
    pub run_id: Uuid,
    pub source: String,
    pub raw_path: PathBuf,
    pub raw_bytes: usize,
    pub raw_hash: String,
    pub rows_loaded: usize,
    pub duplicates_removed: usize,
    pub rows_written: usize,
    pub columns: Vec<String>,
    pub renamed: Vec<ColumnRename>,
    pub coercions: Vec<ColumnCoercion>,
    pub processed_path: PathBuf,
}

impl EtlSummary {
    pub fn coercion_warnings(&self) -> impl Iterator<Item = &ColumnCoercionWarning> {
        self.coercions.iter().filter_map(|c| match &c.outcome {
            CoercionOutcome::Failed(warning) => Some(warning),
            _ => None,
        })
    }
}

/// Downloads the configured URL and runs the full pipeline.
pub fn run_etl(config: &PipelineConfig) -> Result<EtlSummary> {
    let source = HttpSource::from_config(config)?;
    run_etl_with_source(config, &source)
}

/// Fetch, keep the raw copy, parse, clean and write the processed Parquet.
/// Any failure aborts the run before the processed file is touched.
pub fn run_etl_with_source(config: &PipelineConfig, source: &dyn RawSource) -> Result<EtlSummary> {
    let run_id = Uuid::new_v4();
    let span = info_span!("etl_run", %run_id);
    let _entered = span.enter();

    let parse_options = config.parse_options()?;
    storage::ensure_directories(config)?;

    let source_name = source.describe();
    info!(source = %source_name, timeout_secs = config.fetch_timeout_secs, "downloading raw data");
    let bytes = source
        .fetch()
        .inspect_err(|err| error!(error = %err, "fetch failed"))?;

    let raw_path = config.raw_path();
    storage::write_raw(&raw_path, &bytes)?;
    let raw_hash = compute_hash(&bytes);
    info!(path = %raw_path.display(), bytes = bytes.len(), hash = %raw_hash, "raw file saved");

    let raw = parse_delimited(&bytes, &parse_options)
        .inspect_err(|err| error!(error = %err, "raw data could not be parsed"))?;
    let rows_loaded = raw.height();
    info!(rows = rows_loaded, columns = raw.width(), "raw table loaded");

    let cleaned = clean_raw_table(raw)?;
    info!(
        rows = cleaned.df.height(),
        duplicates_removed = cleaned.duplicates_removed,
        renamed = cleaned.renamed.len(),
        "dataset cleaned"
    );

    let processed_path = config.processed_path();
    let written = storage::write_parquet(&processed_path, &cleaned.df)?;
    info!(path = %processed_path.display(), bytes = written, "processed dataset saved");

    Ok(EtlSummary {
        run_id,
        source: source_name,
        raw_path,
        raw_bytes: bytes.len(),
        raw_hash,
        rows_loaded,
        duplicates_removed: cleaned.duplicates_removed,
        rows_written: cleaned.df.height(),
        columns: cleaned
            .df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect(),
        renamed: cleaned.renamed,
        coercions: cleaned.coercions,
        processed_path,
    })
}

fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    hasher.finalize().to_hex().to_string()
}
