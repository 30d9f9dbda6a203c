//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use board_export::ExportConfig;

/// Config file picked up from the working directory when present.
pub const LOCAL_CONFIG_FILE: &str = ".board-export.json";

/// Output file used when neither flag nor env var names one.
pub const DEFAULT_OUTPUT_FILE: &str = "board_by_group_with_comments.json";

/// Resolve the config file path, if any.
///
/// Order: explicit path, `BOARD_EXPORT_CONFIG`, then `./.board-export.json`
/// when it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var("BOARD_EXPORT_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    let cwd_config = PathBuf::from(LOCAL_CONFIG_FILE);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    None
}

/// Load the effective config; built-in defaults when no file resolves.
pub fn load_config(explicit: Option<&Path>) -> Result<ExportConfig> {
    match resolve_config_path(explicit) {
        Some(path) => read_config(&path),
        None => Ok(ExportConfig::default()),
    }
}

/// Parse one config file. Missing fields take their defaults.
pub fn read_config(path: &Path) -> Result<ExportConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolve where the export is written.
pub fn resolve_output_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Ok(env_path) = std::env::var("BOARD_EXPORT_OUTPUT") {
        return PathBuf::from(env_path);
    }

    PathBuf::from(DEFAULT_OUTPUT_FILE)
}
