use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// How a job is named in diagnostics: its resolved name, or its position when
/// the defaulting pass has not named it yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobLabel {
    Named(String),
    Index(usize),
}

impl JobLabel {
    pub fn new(name: Option<&str>, index: usize) -> Self {
        match name {
            Some(name) if !name.is_empty() => JobLabel::Named(name.to_string()),
            _ => JobLabel::Index(index),
        }
    }
}

impl fmt::Display for JobLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobLabel::Named(name) => f.write_str(name),
            JobLabel::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Everything that stops the poller before the scheduler starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config error: Configuration file not provided")]
    NotProvided,
    #[error("config error: failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config error: failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("config error: config.schedule not set")]
    ScheduleNotSet,
    #[error("config error: config.port must be a nonzero port number")]
    InvalidPort,
    #[error("config error: config.jobs[{job}] endpoint not set")]
    JobEndpointNotSet { job: JobLabel },
    #[error("config error: No expected body provided for {job}")]
    EmptyExpectedBody { job: JobLabel },
    #[error("config error: failed to read body file {path:?} for {job}: {source}")]
    BodyFileRead {
        job: JobLabel,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config error: body file {path:?} for {job} is not a JSON object: {source}")]
    BodyFileParse {
        job: JobLabel,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while running a cycle. Expectation mismatches are not errors.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{job}: request to {url} failed: {source}")]
    Transport {
        job: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
