#![allow(dead_code)]

use std::path::Path;

use dataco_core::error::FetchError;
use dataco_core::fetch::RawSource;
use dataco_core::PipelineConfig;

pub fn fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../dataco-parser/tests/data")
        .join(name);
    std::fs::read(path).expect("read fixture")
}

pub fn test_config(root: &Path) -> PipelineConfig {
    PipelineConfig::with_data_dir(root.join("data"))
}

/// Serves fixed bytes, or a fixed failure, without touching the network.
pub struct MemorySource {
    body: Result<Vec<u8>, u16>,
}

impl MemorySource {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: Ok(body.into()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self { body: Err(status) }
    }
}

impl RawSource for MemorySource {
    fn describe(&self) -> String {
        "memory://test".to_string()
    }

    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        match &self.body {
            Ok(bytes) => Ok(bytes.clone()),
            Err(status) => Err(FetchError::Status {
                url: self.describe(),
                status: *status,
            }),
        }
    }
}
