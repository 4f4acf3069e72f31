use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::Path;

use polars::io::parquet::write::{ParquetCompression, ParquetWriter, StatisticsOptions};
use polars::prelude::*;
use tempfile::NamedTempFile;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};

pub fn ensure_directories(config: &PipelineConfig) -> Result<()> {
    for dir in [&config.raw_dir, &config.processed_dir] {
        fs::create_dir_all(dir).map_err(|err| PipelineError::io(dir, err))?;
    }
    Ok(())
}

/// Overwrites `path` with the bytes exactly as fetched.
pub fn write_raw(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).map_err(|err| PipelineError::io(path, err))
}

/// Writes `df` as Parquet at `path`. The file is staged next to its final
/// location and renamed into place, so readers never see a partial file.
pub fn write_parquet(path: &Path, df: &DataFrame) -> Result<u64> {
    let bytes = create_parquet_bytes(df)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(|err| PipelineError::io(dir, err))?;
    staged
        .write_all(&bytes)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|err| PipelineError::io(staged.path(), err))?;
    staged
        .persist(path)
        .map_err(|err| PipelineError::io(path, err.error))?;

    Ok(bytes.len() as u64)
}

pub fn read_parquet(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|err| PipelineError::io(path, err))?;
    Ok(ParquetReader::new(file).finish()?)
}

fn create_parquet_bytes(df: &DataFrame) -> PolarsResult<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let mut clone = df.clone();
        ParquetWriter::new(&mut cursor)
            .with_compression(ParquetCompression::Zstd(None))
            .with_statistics(StatisticsOptions::default())
            .finish(&mut clone)?;
    }
    Ok(buffer)
}
