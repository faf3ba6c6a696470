//! Root folder resolution priority tests
//!
//! Tests that manipulate LAKE_ROOT_FOLDER are marked with #[serial]
//! so they never run in parallel with each other.

use lake_common::config::{default_root_folder, ConfigSource, TomlConfig, ROOT_FOLDER_ENV};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let config = TomlConfig::default();
    assert_eq!(config.resolve_root_folder(None), default_root_folder());
}

#[test]
#[serial]
fn test_env_var_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/lake-test-env-folder");

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/lake-test-toml-folder")),
        ..Default::default()
    };
    let resolved = config.resolve_root_folder(None);

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(resolved, PathBuf::from("/tmp/lake-test-env-folder"));
}

#[test]
#[serial]
fn test_cli_beats_env_var() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/lake-test-env-folder");

    let config = TomlConfig::default();
    let resolved = config.resolve_root_folder(Some(Path::new("/tmp/lake-test-cli-folder")));

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(resolved, PathBuf::from("/tmp/lake-test-cli-folder"));
}

#[test]
#[serial]
fn test_toml_used_when_env_unset() {
    env::remove_var(ROOT_FOLDER_ENV);

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/lake-test-toml-folder")),
        ..Default::default()
    };
    let paths = config.store_paths(None);
    assert_eq!(
        paths.silver,
        PathBuf::from("/tmp/lake-test-toml-folder/silver_raw.db")
    );
}

#[test]
fn test_load_explicit_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lake.toml");
    std::fs::write(
        &path,
        r#"
        [trigger]
        prefix = "raw_"

        [logging]
        file = "/tmp/lake.log"
        "#,
    )
    .unwrap();

    let (config, source) = TomlConfig::load(Some(&path)).unwrap();
    assert_eq!(source, ConfigSource::File(path.clone()));
    assert_eq!(config.trigger.prefix, "raw_");
    assert_eq!(config.trigger.suffix, ".csv");
    assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/lake.log")));
}
