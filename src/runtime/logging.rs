//! JSONL run logger.
//!
//! Every crew run writes one file, `run-{timestamp}-{id}.jsonl`, into the
//! configured log directory. Each line is a self-describing event tagged
//! with `event_type`, flushed as soon as it is written.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::RuntimeError;

/// Returns the current UTC time as an ISO 8601 string with milliseconds.
pub fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// One line of the run log.
///
/// Tagged with `event_type` so each line is self-describing.
#[derive(Debug, Serialize)]
#[serde(tag = "event_type")]
pub enum LogEntry {
    /// A crew run began.
    #[serde(rename = "run_start")]
    RunStart {
        timestamp: String,
        run_id: String,
        crew: String,
        model: String,
        process: String,
    },

    /// A task was handed to an agent.
    #[serde(rename = "task_start")]
    TaskStart {
        timestamp: String,
        task_id: String,
        agent: String,
    },

    /// A tool call requested by the model.
    #[serde(rename = "tool_call")]
    ToolCall {
        timestamp: String,
        task_id: String,
        call_id: String,
        fn_name: String,
        fn_arguments: serde_json::Value,
    },

    /// The result returned to the model for a tool call.
    #[serde(rename = "tool_result")]
    ToolResult {
        timestamp: String,
        task_id: String,
        call_id: String,
        fn_name: String,
        result: String,
    },

    /// A task finished with the agent's final answer.
    #[serde(rename = "task_end")]
    TaskEnd {
        timestamp: String,
        task_id: String,
        output: String,
    },

    /// The run failed. `task_id` names the failing task when there is one.
    #[serde(rename = "error")]
    Error {
        timestamp: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        task_id: Option<String>,
        message: String,
    },

    /// Marks the end of a run, successful or not, with total usage.
    #[serde(rename = "run_end")]
    RunEnd {
        timestamp: String,
        status: String,
        total_tokens: u64,
        successful_requests: u64,
    },
}

pub struct RunLogger {
    writer: BufWriter<fs::File>,
    log_path: PathBuf,
    run_id: String,
}

impl RunLogger {
    /// Create the log directory if needed and open a fresh run file in it.
    pub fn new(log_dir: &Path) -> Result<Self, RuntimeError> {
        let to_err = |e: std::io::Error| RuntimeError::LoggingError(format!("{}: {e}", log_dir.display()));
        fs::create_dir_all(log_dir).map_err(to_err)?;

        let run_id = Uuid::new_v4().to_string();
        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
        let log_path = log_dir.join(format!("run-{stamp}-{}.jsonl", &run_id[..8]));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(to_err)?;

        Ok(Self {
            writer: BufWriter::new(file),
            log_path,
            run_id,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Serialize a log entry as a single JSON line and flush.
    pub fn log_event(&mut self, event: &LogEntry) -> Result<(), RuntimeError> {
        serde_json::to_writer(&mut self.writer, event)
            .map_err(|e| RuntimeError::LoggingError(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .and_then(|_| self.writer.flush())
            .map_err(|e| RuntimeError::LoggingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;
    use tempfile::TempDir;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        let file = fs::File::open(path).expect("open log");
        std::io::BufReader::new(file)
            .lines()
            .map(|l| serde_json::from_str(&l.expect("line")).expect("valid JSON"))
            .collect()
    }

    #[test]
    fn creates_run_file_in_log_dir() {
        let tmp = TempDir::new().unwrap();
        let log_dir = tmp.path().join("logs");
        let logger = RunLogger::new(&log_dir).unwrap();

        assert!(logger.log_path().exists());
        assert!(logger.log_path().starts_with(&log_dir));
        let name = logger.log_path().file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("run-"));
        assert!(name.ends_with(".jsonl"));
        assert!(name.contains(&logger.run_id()[..8]));
    }

    #[test]
    fn events_are_tagged_lines() {
        let tmp = TempDir::new().unwrap();
        let mut logger = RunLogger::new(tmp.path()).unwrap();
        let run_id = logger.run_id().to_string();

        logger
            .log_event(&LogEntry::RunStart {
                timestamp: now_iso(),
                run_id,
                crew: "Wallet Summary".into(),
                model: "test-model".into(),
                process: "sequential".into(),
            })
            .unwrap();
        logger
            .log_event(&LogEntry::Error {
                timestamp: now_iso(),
                task_id: None,
                message: "boom".into(),
            })
            .unwrap();
        logger
            .log_event(&LogEntry::RunEnd {
                timestamp: now_iso(),
                status: "failed".into(),
                total_tokens: 42,
                successful_requests: 3,
            })
            .unwrap();

        let lines = read_lines(logger.log_path());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["event_type"], "run_start");
        assert_eq!(lines[0]["crew"], "Wallet Summary");
        assert_eq!(lines[1]["event_type"], "error");
        assert!(lines[1].get("task_id").is_none());
        assert_eq!(lines[2]["total_tokens"], 42);
    }
}
