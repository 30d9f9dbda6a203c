//! Config and output path resolution.

use std::path::{Path, PathBuf};

use board_export::ExportConfig;
use board_export_cli::config::{
    load_config, read_config, resolve_config_path, resolve_output_path, DEFAULT_OUTPUT_FILE,
    LOCAL_CONFIG_FILE,
};

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");
    std::fs::write(&path, r#"{ "wait_timeout_ms": 30000, "log_every": 25 }"#).unwrap();

    let config = read_config(&path).unwrap();
    assert_eq!(config.wait_timeout_ms, 30_000);
    assert_eq!(config.log_every, 25);
    assert_eq!(config.max_feed_rounds, ExportConfig::default().max_feed_rounds);
    assert_eq!(config.stability_rounds, 3);
}

#[test]
fn test_invalid_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = load_config(Some(&path)).unwrap_err();
    assert!(format!("{err:#}").contains("broken.json"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_config(Some(&dir.path().join("absent.json"))).is_err());
}

#[test]
fn test_explicit_paths_win() {
    let explicit = Path::new("/tmp/explicit.json");
    assert_eq!(resolve_config_path(Some(explicit)), Some(explicit.to_path_buf()));
    assert_eq!(
        resolve_output_path(Some(Path::new("out/board.json"))),
        PathBuf::from("out/board.json")
    );
}

/// Env vars and the working directory are process-wide, so every
/// fallback step is checked in this one test.
#[test]
fn test_fallback_layering() {
    let dir = tempfile::tempdir().unwrap();
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    std::env::remove_var("BOARD_EXPORT_CONFIG");
    std::env::remove_var("BOARD_EXPORT_OUTPUT");

    // Nothing anywhere: defaults.
    assert_eq!(resolve_config_path(None), None);
    assert_eq!(load_config(None).unwrap(), ExportConfig::default());
    assert_eq!(resolve_output_path(None), PathBuf::from(DEFAULT_OUTPUT_FILE));

    // Working-directory file.
    std::fs::write(LOCAL_CONFIG_FILE, r#"{ "close_pause_ms": 500 }"#).unwrap();
    assert_eq!(resolve_config_path(None), Some(PathBuf::from(LOCAL_CONFIG_FILE)));
    assert_eq!(load_config(None).unwrap().close_pause_ms, 500);

    // Env vars beat the working-directory file and the default output.
    let env_config = dir.path().join("from-env.json");
    std::fs::write(&env_config, r#"{ "close_pause_ms": 750 }"#).unwrap();
    std::env::set_var("BOARD_EXPORT_CONFIG", &env_config);
    std::env::set_var("BOARD_EXPORT_OUTPUT", "exports/today.json");
    assert_eq!(load_config(None).unwrap().close_pause_ms, 750);
    assert_eq!(resolve_output_path(None), PathBuf::from("exports/today.json"));

    std::env::remove_var("BOARD_EXPORT_CONFIG");
    std::env::remove_var("BOARD_EXPORT_OUTPUT");
    std::env::set_current_dir(previous).unwrap();
}
