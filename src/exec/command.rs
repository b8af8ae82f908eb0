//! Subprocess execution with captured output.
//!
//! Every external program the crew tools touch (the script runtime, the
//! Clarinet CLI) goes through [`run_command`]. Failures never surface as
//! `Err`: they are folded into the returned [`CommandResult`] so callers can
//! render them the same way as a successful run.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Result of running an external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code, or -1 when the process never ran, was killed by a
    /// signal, or timed out.
    pub exit_code: i32,
    pub succeeded: bool,
    /// Empty on success. Otherwise the captured stderr, or a synthesized
    /// message when stderr was empty.
    pub error: String,
    pub timed_out: bool,
}

impl CommandResult {
    /// Build a result for a process that ran to completion (or was killed).
    pub fn completed(program: &str, code: Option<i32>, stdout: String, stderr: String) -> Self {
        let succeeded = code == Some(0);
        let error = if succeeded {
            String::new()
        } else {
            let trimmed = stderr.trim();
            match code {
                _ if !trimmed.is_empty() => trimmed.to_string(),
                Some(c) => format!("{program} exited with code {c}"),
                None => format!("{program} was terminated by a signal"),
            }
        };

        Self {
            stdout,
            stderr,
            exit_code: code.unwrap_or(-1),
            succeeded,
            error,
            timed_out: false,
        }
    }

    /// Build a failed result for a command that could not be run at all.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: -1,
            succeeded: false,
            error: if message.is_empty() {
                "command failed".to_string()
            } else {
                message
            },
            timed_out: false,
        }
    }

    fn timed_out(program: &str, limit: Duration, stdout: String, stderr: String) -> Self {
        Self {
            stdout,
            stderr,
            exit_code: -1,
            succeeded: false,
            error: format!("{program} timed out after {limit:?}"),
            timed_out: true,
        }
    }
}

/// Run `program` with `args` inside `working_dir` and capture its output.
///
/// Blocks (asynchronously) until the process exits. With `timeout` set, the
/// child's whole process group is killed once the limit passes and the
/// result reports `timed_out`. Without it the call waits indefinitely.
pub async fn run_command(
    program: &str,
    args: &[&str],
    working_dir: &Path,
    timeout: Option<Duration>,
) -> CommandResult {
    tracing::debug!(program, ?args, cwd = %working_dir.display(), "Spawning command");

    let spawned = Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .process_group(0)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(program, cwd = %working_dir.display(), "Failed to spawn: {e}");
            return CommandResult::failure(format!("failed to run {program}: {e}"));
        }
    };

    // The child is its own group leader. Keep the id: `Child::id` is gone
    // once the child has been reaped.
    let pgid = child.id();
    let stdout_task = child.stdout.take().map(|out| tokio::spawn(read_all(out)));
    let stderr_task = child.stderr.take().map(|err| tokio::spawn(read_all(err)));

    let deadline = timeout.map(|limit| Instant::now() + limit);
    let waited = match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, child.wait()).await.ok(),
        None => Some(child.wait().await),
    };
    let mut timed_out = waited.is_none();
    if timed_out {
        kill_process_group(pgid, &mut child).await;
    }

    // Processes left behind in the group keep the pipes open after the
    // child exits, so the deadline covers reading as well.
    let output = async move { (collect(stdout_task).await, collect(stderr_task).await) };
    tokio::pin!(output);
    let (stdout, stderr) = match deadline {
        Some(deadline) if !timed_out => match tokio::time::timeout_at(deadline, &mut output).await {
            Ok(out) => out,
            Err(_) => {
                timed_out = true;
                kill_process_group(pgid, &mut child).await;
                output.await
            }
        },
        _ => output.await,
    };

    let result = match waited {
        Some(Ok(status)) if !timed_out => CommandResult::completed(program, status.code(), stdout, stderr),
        Some(Err(e)) if !timed_out => CommandResult {
            stdout,
            stderr,
            ..CommandResult::failure(format!("failed waiting for {program}: {e}"))
        },
        _ => CommandResult::timed_out(program, timeout.unwrap_or_default(), stdout, stderr),
    };

    if !result.succeeded {
        tracing::warn!(program, exit_code = result.exit_code, "Command failed: {}", result.error);
    }
    result
}

/// SIGKILL the child's process group and reap the child.
async fn kill_process_group(pgid: Option<u32>, child: &mut Child) {
    if let Some(pgid) = pgid {
        let pgid = nix::unistd::Pid::from_raw(pgid as i32);
        let _ = nix::sys::signal::killpg(pgid, nix::sys::signal::Signal::SIGKILL);
    }
    let _ = child.wait().await;
}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> Vec<u8> {
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    buf
}

async fn collect(task: Option<JoinHandle<Vec<u8>>>) -> String {
    match task {
        Some(handle) => handle
            .await
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default(),
        None => String::new(),
    }
}
