use std::path::PathBuf;

/// Errors related to configuration loading and parsing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config at {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Errors raised before a tool touches the outside world: bad arguments or
/// writes that would land outside the Clarinet projects directory.
#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    #[error("Invalid {name} `{value}`: {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Missing argument `{0}`")]
    Missing(String),

    #[error("Write outside projects directory: `{path}` is not within `{root}`")]
    OutsideProjects { path: PathBuf, root: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to crew definitions and crew assembly.
#[derive(Debug, thiserror::Error)]
pub enum CrewError {
    #[error("Missing required input `{0}`")]
    MissingInput(String),

    #[error("Invalid input `{name}`: {reason}")]
    InvalidInput { name: String, reason: String },

    #[error("Task `{task}` references unknown agent `{agent}`")]
    UnknownAgent { task: String, agent: String },

    #[error("Agent `{agent}` references unknown tool `{tool}`")]
    UnknownTool { agent: String, tool: String },

    #[error("Task `{task}` depends on `{context}`, which is not an earlier task")]
    UnknownContextTask { task: String, context: String },

    #[error("Duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Blank {kind} {field}")]
    BlankField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("Crew `{0}` has no tasks")]
    NoTasks(String),

    #[error("Invalid crew definition at {path}: {message}")]
    InvalidDefinition { path: PathBuf, message: String },

    #[error("Unknown crew `{0}`")]
    UnknownCrew(String),
}

/// Errors from the Stacks blockchain HTTP API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status} for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Unexpected API response: {0}")]
    Malformed(String),
}

/// Errors related to running a crew against an LLM.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Task `{task}` failed: {message}")]
    TaskFailed { task: String, message: String },

    #[error("Invalid crew: {0}")]
    InvalidCrew(#[from] CrewError),

    #[error("Run logging error: {0}")]
    LoggingError(String),
}
