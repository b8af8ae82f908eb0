use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use super::command::{run_command, CommandResult};

/// Runs the TypeScript tool scripts (`<runtime> run src/<script> [arg]`)
/// from the scripts checkout directory.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    runtime: String,
    runtime_args: Vec<String>,
    scripts_dir: PathBuf,
    timeout: Option<Duration>,
}

impl ScriptRunner {
    pub fn new(
        runtime: impl Into<String>,
        runtime_args: Vec<String>,
        scripts_dir: impl Into<PathBuf>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            runtime: runtime.into(),
            runtime_args,
            scripts_dir: scripts_dir.into(),
            timeout,
        }
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    /// Run one script with at most one positional argument.
    ///
    /// `script` is relative to `<scripts_dir>/src`. Paths that escape that
    /// directory or do not exist fail without spawning anything.
    pub async fn run_script(&self, script: &str, arg: Option<&str>) -> CommandResult {
        let relative = Path::new("src").join(script);
        if !is_contained(&relative) {
            return CommandResult::failure(format!("invalid script path: {script}"));
        }
        if !self.scripts_dir.join(&relative).is_file() {
            return CommandResult::failure(format!(
                "script not found: {}",
                self.scripts_dir.join(&relative).display()
            ));
        }

        let relative = relative.to_string_lossy();
        let mut args: Vec<&str> = self.runtime_args.iter().map(String::as_str).collect();
        args.push(&relative);
        if let Some(arg) = arg {
            args.push(arg);
        }

        tracing::info!(script, runtime = %self.runtime, "Running tool script");
        run_command(&self.runtime, &args, &self.scripts_dir, self.timeout).await
    }
}

/// True when `path` is relative and never steps above its starting point.
fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contained_paths() {
        assert!(is_contained(Path::new("src/stacks-wallet/get-balance.ts")));
        assert!(!is_contained(Path::new("src/../../etc/passwd")));
        assert!(!is_contained(Path::new("/etc/passwd")));
    }

    #[tokio::test]
    async fn escaping_script_is_rejected_without_spawning() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = ScriptRunner::new("sh", vec![], tmp.path(), None);
        let result = runner.run_script("../outside.sh", None).await;
        assert!(!result.succeeded);
        assert!(result.error.contains("invalid script path"));
    }
}
