use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use dataco_core::fetch::{FileSource, HttpSource, RawSource};
use dataco_core::kpis::format_kpi_line;
use dataco_core::{run_etl_with_source, EtlSummary, KpiEngine, KpiReport, PipelineConfig};

const NO_KPIS: &str = "No KPIs could be computed (check the column names).";

pub fn run(config: &PipelineConfig, source_file: Option<&Path>) -> Result<()> {
    let summary = execute_etl(config, source_file)?;
    let report = KpiEngine::new(config)
        .compute_all_kpis(Some(&summary.processed_path))
        .context("failed to compute KPIs")?;

    write_report(&mut io::stdout().lock(), &report)?;
    Ok(())
}

pub fn etl(config: &PipelineConfig, source_file: Option<&Path>, json: bool) -> Result<()> {
    let summary = execute_etl(config, source_file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.processed_path.display());
    }
    Ok(())
}

pub fn kpis(config: &PipelineConfig, path: Option<&Path>, json: bool) -> Result<()> {
    let report = KpiEngine::new(config)
        .compute_all_kpis(path)
        .context("failed to compute KPIs")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        write_report(&mut io::stdout().lock(), &report)?;
    }
    Ok(())
}

fn execute_etl(config: &PipelineConfig, source_file: Option<&Path>) -> Result<EtlSummary> {
    let source: Box<dyn RawSource> = match source_file {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(HttpSource::from_config(config).context("failed to build HTTP client")?),
    };

    run_etl_with_source(config, source.as_ref()).context("ETL run failed")
}

fn write_report<W: Write>(out: &mut W, report: &KpiReport) -> io::Result<()> {
    if report.is_empty() {
        return writeln!(out, "{NO_KPIS}");
    }

    writeln!(out, "\n=== Logistics KPIs ===")?;
    for (name, value) in &report.kpis {
        writeln!(out, "{}", format_kpi_line(*name, *value))?;
    }
    Ok(())
}
