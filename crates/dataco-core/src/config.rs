use std::path::{Path, PathBuf};
use std::time::Duration;

use dataco_parser::ParseOptions;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

pub const DEFAULT_SOURCE_URL: &str = "https://raw.githubusercontent.com/raghav19980730/DataCo-Supply-Chain-Goods-Delivery-Prediction/main/DescriptionDataCoSupplyChain.csv";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_RAW_FILENAME: &str = "DataCoSupplyChain.csv";
pub const DEFAULT_PROCESSED_FILENAME: &str = "data_co_clean.parquet";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

pub const ENV_SOURCE_URL: &str = "DATACO_URL";
pub const ENV_DATA_DIR: &str = "DATACO_DATA_DIR";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "DATACO_TIMEOUT_SECS";

/// Everything a pipeline run needs to know about where data comes from and
/// where it goes. Passed explicitly to the ingestion and KPI stages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    pub source_url: String,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub raw_filename: String,
    pub processed_filename: String,
    pub fetch_timeout_secs: u64,
    pub delimiter: char,
    pub infer_schema_length: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let data_dir = Path::new(DEFAULT_DATA_DIR);
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            raw_dir: data_dir.join("raw"),
            processed_dir: data_dir.join("processed"),
            raw_filename: DEFAULT_RAW_FILENAME.to_string(),
            processed_filename: DEFAULT_PROCESSED_FILENAME.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            delimiter: ',',
            infer_schema_length: None,
        }
    }
}

impl PipelineConfig {
    /// Defaults rooted at `data_dir` instead of `./data`.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            raw_dir: data_dir.join("raw"),
            processed_dir: data_dir.join("processed"),
            ..Self::default()
        }
    }

    pub fn raw_path(&self) -> PathBuf {
        self.raw_dir.join(&self.raw_filename)
    }

    pub fn processed_path(&self) -> PathBuf {
        self.processed_dir.join(&self.processed_filename)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn parse_options(&self) -> Result<ParseOptions> {
        self.validate_delimiter()?;
        let delimiter = u8::try_from(self.delimiter)
            .map_err(|err| PipelineError::Config(format!("delimiter {:?}: {err}", self.delimiter)))?;
        Ok(ParseOptions {
            delimiter,
            infer_schema_length: self.infer_schema_length,
            ..ParseOptions::default()
        })
    }

    /// Layers `overrides` on top of `self`. A `data_dir` override moves both
    /// directories; explicit `raw_dir` / `processed_dir` win over it.
    pub fn apply(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(url) = overrides.source_url {
            self.source_url = url;
        }
        if let Some(data_dir) = overrides.data_dir {
            self.raw_dir = data_dir.join("raw");
            self.processed_dir = data_dir.join("processed");
        }
        if let Some(dir) = overrides.raw_dir {
            self.raw_dir = dir;
        }
        if let Some(dir) = overrides.processed_dir {
            self.processed_dir = dir;
        }
        if let Some(name) = overrides.raw_filename {
            self.raw_filename = name;
        }
        if let Some(name) = overrides.processed_filename {
            self.processed_filename = name;
        }
        if let Some(secs) = overrides.fetch_timeout_secs {
            self.fetch_timeout_secs = secs;
        }
        if let Some(delimiter) = overrides.delimiter {
            self.delimiter = delimiter;
        }
        if let Some(length) = overrides.infer_schema_length {
            self.infer_schema_length = Some(length);
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.source_url.trim().is_empty() {
            return Err(PipelineError::Config("source_url must not be empty".into()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(PipelineError::Config(
                "fetch_timeout_secs must be greater than zero".into(),
            ));
        }
        self.validate_delimiter()?;
        if self.raw_filename.is_empty() || self.processed_filename.is_empty() {
            return Err(PipelineError::Config("file names must not be empty".into()));
        }
        Ok(())
    }

    fn validate_delimiter(&self) -> Result<()> {
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(PipelineError::Config(format!(
                "delimiter {:?} must be a single ASCII character other than a quote or newline",
                self.delimiter
            )));
        }
        Ok(())
    }
}

/// Partial settings from a TOML file, the environment or the command line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub source_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub raw_dir: Option<PathBuf>,
    pub processed_dir: Option<PathBuf>,
    pub raw_filename: Option<String>,
    pub processed_filename: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub delimiter: Option<char>,
    pub infer_schema_length: Option<usize>,
}

impl ConfigOverrides {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| PipelineError::Config(err.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| PipelineError::io(path, err))?;
        Self::from_toml_str(&content)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Reads the `DATACO_*` variables through `lookup`.
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch_timeout_secs = match lookup(ENV_FETCH_TIMEOUT_SECS) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|err| {
                PipelineError::Config(format!("{ENV_FETCH_TIMEOUT_SECS}='{raw}': {err}"))
            })?),
            None => None,
        };

        Ok(Self {
            source_url: lookup(ENV_SOURCE_URL).filter(|v| !v.trim().is_empty()),
            data_dir: lookup(ENV_DATA_DIR)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            fetch_timeout_secs,
            ..Self::default()
        })
    }
}
