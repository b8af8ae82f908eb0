use std::path::{Path, PathBuf};
use std::time::Duration;

use super::command::{run_command, CommandResult};

/// Thin wrapper over the Clarinet CLI. Projects live under `projects_dir`,
/// one directory per project.
#[derive(Debug, Clone)]
pub struct ClarinetRunner {
    binary: String,
    projects_dir: PathBuf,
    timeout: Option<Duration>,
}

impl ClarinetRunner {
    pub fn new(binary: impl Into<String>, projects_dir: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            binary: binary.into(),
            projects_dir: projects_dir.into(),
            timeout,
        }
    }

    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.projects_dir.join(project)
    }

    /// Path of a contract source file, relative to the projects directory.
    pub fn contract_path(project: &str, contract: &str) -> PathBuf {
        Path::new(project)
            .join("contracts")
            .join(format!("{contract}.clar"))
    }

    /// `clarinet new <project>` inside the projects directory.
    pub async fn new_project(&self, project: &str) -> CommandResult {
        if let Err(e) = tokio::fs::create_dir_all(&self.projects_dir).await {
            return CommandResult::failure(format!(
                "failed to create {}: {e}",
                self.projects_dir.display()
            ));
        }
        if self.project_dir(project).exists() {
            return CommandResult::failure(format!("project `{project}` already exists"));
        }
        run_command(
            &self.binary,
            &["new", "--disable-telemetry", project],
            &self.projects_dir,
            self.timeout,
        )
        .await
    }

    /// `clarinet contract new <contract>` inside an existing project.
    pub async fn add_contract(&self, project: &str, contract: &str) -> CommandResult {
        match self.existing_project(project) {
            Ok(dir) => run_command(&self.binary, &["contract", "new", contract], &dir, self.timeout).await,
            Err(result) => result,
        }
    }

    /// `clarinet check` inside an existing project.
    pub async fn check(&self, project: &str) -> CommandResult {
        match self.existing_project(project) {
            Ok(dir) => run_command(&self.binary, &["check"], &dir, self.timeout).await,
            Err(result) => result,
        }
    }

    fn existing_project(&self, project: &str) -> Result<PathBuf, CommandResult> {
        let dir = self.project_dir(project);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(CommandResult::failure(format!(
                "project `{project}` not found in {}",
                self.projects_dir.display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_path_layout() {
        assert_eq!(
            ClarinetRunner::contract_path("demo", "counter"),
            PathBuf::from("demo/contracts/counter.clar")
        );
    }

    #[tokio::test]
    async fn check_on_missing_project_fails_without_spawning() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = ClarinetRunner::new("clarinet-not-installed", tmp.path(), None);
        let result = runner.check("nope").await;
        assert!(!result.succeeded);
        assert!(result.error.contains("not found"));
    }

    /// Stand-in for the clarinet binary: logs `cwd|args` and creates the
    /// project directory on `new`.
    fn stub_binary(dir: &Path, log: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("clarinet-stub");
        let script = format!(
            "#!/bin/sh\necho \"$(pwd)|$*\" >> '{}'\nif [ \"$1\" = new ]; then mkdir -p \"$3\"; fi\n",
            log.display()
        );
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn commands_run_in_the_expected_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        let log = root.join("calls.log");
        let binary = stub_binary(&root, &log);
        let projects = root.join("projects");
        let runner = ClarinetRunner::new(
            binary.to_string_lossy(),
            &projects,
            Some(Duration::from_secs(10)),
        );

        let created = runner.new_project("demo").await;
        assert!(created.succeeded, "{}", created.error);
        assert!(runner.add_contract("demo", "counter").await.succeeded);
        assert!(runner.check("demo").await.succeeded);

        let calls = std::fs::read_to_string(&log).unwrap();
        let demo = projects.join("demo");
        let expected = [
            format!("{}|new --disable-telemetry demo", projects.display()),
            format!("{}|contract new counter", demo.display()),
            format!("{}|check", demo.display()),
        ];
        assert_eq!(calls.lines().collect::<Vec<_>>(), expected);
    }

    #[tokio::test]
    async fn existing_project_is_not_recreated() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("demo")).unwrap();
        let runner = ClarinetRunner::new("clarinet-not-installed", tmp.path(), None);
        let result = runner.new_project("demo").await;
        assert!(!result.succeeded);
        assert!(result.error.contains("already exists"));
    }
}
