use serde::Deserialize;
use std::path::PathBuf;

/// The TOML file structure for aibtc-crew.toml.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub general: Option<GeneralConfig>,
    pub scripts: Option<ScriptsConfig>,
    pub clarinet: Option<ClarinetConfig>,
    pub api: Option<ApiConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    pub model: Option<String>,
    pub workspace: Option<String>,
    pub crews_dir: Option<String>,
    pub log_dir: Option<String>,
    pub max_iterations: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ScriptsConfig {
    pub runtime: Option<String>,
    /// Arguments placed between the runtime and the script path.
    pub args: Option<Vec<String>>,
    pub dir: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ClarinetConfig {
    pub binary: Option<String>,
    pub projects_dir: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    pub hiro_url: Option<String>,
}

/// Fully-resolved runtime configuration. All fields have values and every
/// path is absolute or relative to the process working directory.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model: String,
    pub workspace: PathBuf,
    pub crews_dir: PathBuf,
    pub log_dir: PathBuf,
    pub max_iterations: usize,
    pub script_runtime: String,
    pub script_args: Vec<String>,
    pub scripts_dir: PathBuf,
    pub script_timeout_secs: Option<u64>,
    pub clarinet_binary: String,
    pub projects_dir: PathBuf,
    pub clarinet_timeout_secs: Option<u64>,
    pub hiro_url: String,
}

/// Partial config used during merge. All fields are Option so that
/// missing fields don't override lower-priority values.
#[derive(Debug, Clone, Default)]
pub struct PartialConfig {
    pub model: Option<String>,
    pub workspace: Option<PathBuf>,
    pub crews_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub max_iterations: Option<usize>,
    pub script_runtime: Option<String>,
    pub script_args: Option<Vec<String>>,
    pub scripts_dir: Option<PathBuf>,
    pub script_timeout_secs: Option<u64>,
    pub clarinet_binary: Option<String>,
    pub projects_dir: Option<PathBuf>,
    pub clarinet_timeout_secs: Option<u64>,
    pub hiro_url: Option<String>,
}

impl ConfigFile {
    pub fn to_partial(self) -> PartialConfig {
        let general = self.general;
        let scripts = self.scripts;
        let clarinet = self.clarinet;

        PartialConfig {
            model: general.as_ref().and_then(|g| g.model.clone()),
            workspace: general.as_ref().and_then(|g| g.workspace.as_ref().map(PathBuf::from)),
            crews_dir: general.as_ref().and_then(|g| g.crews_dir.as_ref().map(PathBuf::from)),
            log_dir: general.as_ref().and_then(|g| g.log_dir.as_ref().map(PathBuf::from)),
            max_iterations: general.as_ref().and_then(|g| g.max_iterations),
            script_runtime: scripts.as_ref().and_then(|s| s.runtime.clone()),
            script_args: scripts.as_ref().and_then(|s| s.args.clone()),
            scripts_dir: scripts.as_ref().and_then(|s| s.dir.as_ref().map(PathBuf::from)),
            script_timeout_secs: scripts.as_ref().and_then(|s| s.timeout_secs),
            clarinet_binary: clarinet.as_ref().and_then(|c| c.binary.clone()),
            projects_dir: clarinet.as_ref().and_then(|c| c.projects_dir.as_ref().map(PathBuf::from)),
            clarinet_timeout_secs: clarinet.as_ref().and_then(|c| c.timeout_secs),
            hiro_url: self.api.and_then(|a| a.hiro_url),
        }
    }
}
