pub mod coercion;
pub mod columns;
pub mod config;
pub mod dedup;
pub mod error;
pub mod fetch;
pub mod ingestion;
pub mod kpis;
pub mod profile;
pub mod storage;

pub use config::{ConfigOverrides, PipelineConfig};
pub use error::{FetchError, PipelineError, Result};
pub use ingestion::{run_etl, run_etl_with_source, EtlSummary};
pub use kpis::{compute_kpis, KpiEngine, KpiName, KpiReport, KpiResult};
