use super::schema::{AppConfig, PartialConfig};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_HIRO_URL: &str = "https://api.testnet.hiro.so";
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

impl PartialConfig {
    /// Merge self with a lower-priority fallback.
    /// Self's non-None values take precedence.
    pub fn with_fallback(self, fallback: PartialConfig) -> PartialConfig {
        PartialConfig {
            model: self.model.or(fallback.model),
            workspace: self.workspace.or(fallback.workspace),
            crews_dir: self.crews_dir.or(fallback.crews_dir),
            log_dir: self.log_dir.or(fallback.log_dir),
            max_iterations: self.max_iterations.or(fallback.max_iterations),
            script_runtime: self.script_runtime.or(fallback.script_runtime),
            script_args: self.script_args.or(fallback.script_args),
            scripts_dir: self.scripts_dir.or(fallback.scripts_dir),
            script_timeout_secs: self.script_timeout_secs.or(fallback.script_timeout_secs),
            clarinet_binary: self.clarinet_binary.or(fallback.clarinet_binary),
            projects_dir: self.projects_dir.or(fallback.projects_dir),
            clarinet_timeout_secs: self.clarinet_timeout_secs.or(fallback.clarinet_timeout_secs),
            hiro_url: self.hiro_url.or(fallback.hiro_url),
        }
    }

    /// Convert to AppConfig, filling any remaining gaps with defaults.
    /// Relative directories are resolved against the workspace.
    pub fn finalize(self) -> AppConfig {
        let workspace = self.workspace.unwrap_or_else(|| PathBuf::from("."));
        let under = |dir: Option<PathBuf>, default: &str| {
            resolve(&workspace, dir.unwrap_or_else(|| PathBuf::from(default)))
        };

        AppConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            crews_dir: under(self.crews_dir, "crews"),
            log_dir: under(self.log_dir, "logs"),
            max_iterations: self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS).max(1),
            script_runtime: self.script_runtime.unwrap_or_else(|| "bun".to_string()),
            script_args: self.script_args.unwrap_or_else(|| vec!["run".to_string()]),
            scripts_dir: under(self.scripts_dir, "agent-tools-ts"),
            script_timeout_secs: self.script_timeout_secs.filter(|s| *s > 0),
            clarinet_binary: self.clarinet_binary.unwrap_or_else(|| "clarinet".to_string()),
            projects_dir: under(self.projects_dir, "clarinet-projects"),
            clarinet_timeout_secs: self.clarinet_timeout_secs.filter(|s| *s > 0),
            hiro_url: self.hiro_url.unwrap_or_else(|| DEFAULT_HIRO_URL.to_string()),
            workspace,
        }
    }
}

fn resolve(workspace: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        workspace.join(path)
    }
}
