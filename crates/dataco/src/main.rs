use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dataco_core::profile::DEFAULT_GROUP_COLUMN;
use dataco_core::{ConfigOverrides, PipelineConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;

/// Downloads the DataCo supply-chain export, cleans it and reports logistics KPIs.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    /// Defaults to `run`.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// TOML file with pipeline settings
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// URL of the raw CSV export
    #[arg(long, global = true)]
    url: Option<String>,

    /// Root for the raw/ and processed/ directories
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Download timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Read the raw CSV from a local file instead of downloading it
    #[arg(long, global = true, value_name = "FILE")]
    source_file: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the ETL and print the KPIs
    Run,
    /// Run the ETL only and print where the processed file went
    Etl {
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute KPIs from an existing processed file
    Kpis {
        /// Processed Parquet file (defaults to the configured one)
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Profile a processed file and break on-time delivery down by a column
    Inspect {
        #[arg(long)]
        path: Option<PathBuf>,
        /// Column to group the on-time breakdown by
        #[arg(long, default_value = DEFAULT_GROUP_COLUMN)]
        by: String,
        /// How many columns to list in the null-count table
        #[arg(long, default_value_t = 20)]
        top_nulls: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.log_format);

    let config = load_config(&cli.global)?;
    debug!(?config, "configuration resolved");

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => commands::run(&config, cli.global.source_file.as_deref()),
        Command::Etl { json } => commands::etl(&config, cli.global.source_file.as_deref(), json),
        Command::Kpis { path, json } => commands::kpis(&config, path.as_deref(), json),
        Command::Inspect {
            path,
            by,
            top_nulls,
        } => commands::inspect(&config, path.as_deref(), &by, top_nulls),
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Defaults, then the TOML file, then `DATACO_*` variables, then flags.
fn load_config(args: &GlobalArgs) -> Result<PipelineConfig> {
    dotenvy::dotenv().ok();

    let mut config = PipelineConfig::default();
    if let Some(path) = &args.config {
        let file = ConfigOverrides::from_toml_file(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?;
        config = config.apply(file)?;
    }

    let env = ConfigOverrides::from_env().context("invalid DATACO_* environment variable")?;
    config = config.apply(env)?;

    let flags = ConfigOverrides {
        source_url: args.url.clone(),
        data_dir: args.data_dir.clone(),
        fetch_timeout_secs: args.timeout_secs,
        ..ConfigOverrides::default()
    };
    config
        .apply(flags)
        .context("invalid command-line settings")
}
