use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use dataco_core::config::{
    ConfigOverrides, PipelineConfig, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_PROCESSED_FILENAME,
    DEFAULT_RAW_FILENAME, DEFAULT_SOURCE_URL, ENV_DATA_DIR, ENV_FETCH_TIMEOUT_SECS, ENV_SOURCE_URL,
};
use dataco_core::PipelineError;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn defaults_point_at_the_data_directory() -> Result<()> {
    let config = PipelineConfig::default();

    assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
    assert_eq!(
        config.raw_path(),
        PathBuf::from("data/raw").join(DEFAULT_RAW_FILENAME)
    );
    assert_eq!(
        config.processed_path(),
        PathBuf::from("data/processed").join(DEFAULT_PROCESSED_FILENAME)
    );
    assert_eq!(config.fetch_timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
    assert_eq!(config.parse_options()?.delimiter, b',');
    Ok(())
}

#[test]
fn toml_overrides_apply_on_top_of_defaults() -> Result<()> {
    let overrides = ConfigOverrides::from_toml_str(
        r#"
        source_url = "https://example.org/export.csv"
        data_dir = "/srv/dataco"
        processed_filename = "clean.parquet"
        fetch_timeout_secs = 5
        delimiter = ";"
        "#,
    )?;

    let config = PipelineConfig::default().apply(overrides)?;

    assert_eq!(config.source_url, "https://example.org/export.csv");
    assert_eq!(config.raw_dir, PathBuf::from("/srv/dataco/raw"));
    assert_eq!(
        config.processed_path(),
        PathBuf::from("/srv/dataco/processed/clean.parquet")
    );
    assert_eq!(config.fetch_timeout().as_secs(), 5);
    assert_eq!(config.parse_options()?.delimiter, b';');
    Ok(())
}

#[test]
fn explicit_directories_win_over_data_dir() -> Result<()> {
    let overrides = ConfigOverrides {
        data_dir: Some("/srv/dataco".into()),
        raw_dir: Some("/mnt/raw".into()),
        ..ConfigOverrides::default()
    };

    let config = PipelineConfig::default().apply(overrides)?;

    assert_eq!(config.raw_dir, PathBuf::from("/mnt/raw"));
    assert_eq!(config.processed_dir, PathBuf::from("/srv/dataco/processed"));
    Ok(())
}

#[test]
fn environment_overrides_are_read_through_lookup() -> Result<()> {
    let vars = env(&[
        (ENV_SOURCE_URL, "http://localhost:8080/data.csv"),
        (ENV_DATA_DIR, "/tmp/dataco"),
        (ENV_FETCH_TIMEOUT_SECS, " 15 "),
    ]);

    let overrides = ConfigOverrides::from_env_with(|key| vars.get(key).cloned())?;
    let config = PipelineConfig::default().apply(overrides)?;

    assert_eq!(config.source_url, "http://localhost:8080/data.csv");
    assert_eq!(config.processed_dir, PathBuf::from("/tmp/dataco/processed"));
    assert_eq!(config.fetch_timeout_secs, 15);
    Ok(())
}

#[test]
fn blank_environment_values_are_ignored() -> Result<()> {
    let vars = env(&[(ENV_SOURCE_URL, "  "), (ENV_DATA_DIR, "")]);

    let overrides = ConfigOverrides::from_env_with(|key| vars.get(key).cloned())?;

    assert_eq!(overrides, ConfigOverrides::default());
    Ok(())
}

#[test]
fn malformed_timeout_in_environment_is_rejected() {
    let vars = env(&[(ENV_FETCH_TIMEOUT_SECS, "soon")]);

    let err = ConfigOverrides::from_env_with(|key| vars.get(key).cloned()).unwrap_err();

    assert!(matches!(err, PipelineError::Config(message) if message.contains(ENV_FETCH_TIMEOUT_SECS)));
}

#[test]
fn invalid_values_fail_validation() {
    let zero_timeout = ConfigOverrides {
        fetch_timeout_secs: Some(0),
        ..ConfigOverrides::default()
    };
    assert!(matches!(
        PipelineConfig::default().apply(zero_timeout),
        Err(PipelineError::Config(_))
    ));

    for delimiter in ['"', '\n', 'é'] {
        let overrides = ConfigOverrides {
            delimiter: Some(delimiter),
            ..ConfigOverrides::default()
        };
        assert!(
            matches!(
                PipelineConfig::default().apply(overrides),
                Err(PipelineError::Config(_))
            ),
            "delimiter {delimiter:?} should be rejected"
        );
    }

    let empty_url = ConfigOverrides {
        source_url: Some(String::new()),
        ..ConfigOverrides::default()
    };
    assert!(PipelineConfig::default().apply(empty_url).is_err());
}

#[test]
fn unknown_toml_keys_are_rejected() {
    let err = ConfigOverrides::from_toml_str("source = \"https://example.org\"").unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn missing_config_file_reports_its_path() {
    let err = ConfigOverrides::from_toml_file(Path::new("does/not/exist.toml")).unwrap_err();
    match err {
        PipelineError::Io { path, .. } => assert_eq!(path, PathBuf::from("does/not/exist.toml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn directly_built_config_checks_its_delimiter() -> Result<()> {
    let config = PipelineConfig {
        delimiter: 'é',
        ..PipelineConfig::default()
    };
    assert!(matches!(config.parse_options(), Err(PipelineError::Config(_))));

    let config = PipelineConfig {
        delimiter: '\t',
        ..PipelineConfig::default()
    };
    assert_eq!(config.parse_options()?.delimiter, b'\t');
    Ok(())
}
