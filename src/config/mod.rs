pub mod merge;
pub mod schema;

pub use schema::*;

use crate::cli::Cli;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "aibtc-crew.toml";

/// Load configuration by merging global, workspace, and CLI sources.
/// Precedence: CLI > workspace config (or `--config`) > global config > defaults.
///
/// Missing config files are handled gracefully (defaults apply).
pub fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    // Layer 1: Global config (~/.config/aibtc-crew/aibtc-crew.toml or platform equivalent)
    let global = load_global_config();

    // Workspace comes from the CLI or the global config, and decides where
    // the workspace config lives.
    let workspace_path = cli
        .workspace
        .clone()
        .or_else(|| global.workspace.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    // Layer 2: explicit --config file, else workspace/aibtc-crew.toml
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| workspace_path.join(CONFIG_FILE_NAME));
    let workspace = load_layer(&config_path);

    // Layer 3: CLI args
    let cli_partial = PartialConfig {
        model: cli.model.clone(),
        workspace: cli.workspace.clone(),
        ..Default::default()
    };

    let config = cli_partial
        .with_fallback(workspace)
        .with_fallback(global)
        .finalize();

    tracing::info!(
        model = %config.model,
        workspace = %config.workspace.display(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Load global config from the platform-specific config directory.
/// Returns empty PartialConfig if file not found.
fn load_global_config() -> PartialConfig {
    match global_config_path() {
        Some(p) => load_layer(&p),
        None => {
            tracing::debug!("Could not determine global config directory");
            PartialConfig::default()
        }
    }
}

/// A layer that fails to load contributes nothing.
fn load_layer(path: &Path) -> PartialConfig {
    match load_toml_file(path) {
        Ok(Some(partial)) => {
            tracing::info!("Loaded config from {}", path.display());
            partial
        }
        Ok(None) => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            PartialConfig::default()
        }
        Err(e) => {
            tracing::warn!("{e}");
            PartialConfig::default()
        }
    }
}

/// Parse a TOML config file. `Ok(None)` when the file does not exist.
pub fn load_toml_file(path: &Path) -> Result<Option<PartialConfig>, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::IoError(e)),
    };
    let file: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(Some(file.to_partial()))
}

/// Resolve the platform-specific global config path.
/// Linux: ~/.config/aibtc-crew/aibtc-crew.toml
/// macOS: ~/Library/Application Support/aibtc-crew/aibtc-crew.toml
fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "aibtc-crew")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
