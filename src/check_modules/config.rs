use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{info, warn};

use super::error::{ConfigError, JobLabel};
use super::validation::validate;

pub const DEFAULT_BASE_URL: &str = "http://localhost";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_STATUS: u16 = 200;

/// Serialization format of a config file, picked from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => ConfigFormat::Toml,
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// The config file as written. Every optional field stays `None` until the
/// defaulting pass fills it, so an explicit zero is never mistaken for "unset".
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub schedule: Option<u64>,
    pub base_url: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub fail_fast: bool,
    pub timeout_ms: Option<u64>,
    pub log_dir: Option<String>,
    #[serde(default)]
    pub jobs: Vec<JobFile>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct JobFile {
    pub name: Option<String>,
    pub description: Option<String>,
    pub endpoint: Option<String>,
    pub status: Option<u16>,
    pub body: Option<String>,
    #[serde(default)]
    pub read_file: bool,
    // Filled by `load_body_files` for `read_file` jobs.
    #[serde(skip)]
    pub file_contents: Option<String>,
    #[serde(skip)]
    pub json_body: Option<serde_json::Value>,
}

impl JobFile {
    pub fn label(&self, index: usize) -> JobLabel {
        JobLabel::new(self.name.as_deref(), index)
    }

    /// A missing or zero status means "expect 200".
    pub fn expected_status(&self) -> u16 {
        self.status.filter(|s| *s != 0).unwrap_or(DEFAULT_STATUS)
    }

    pub fn body_source(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

pub fn parse_config(
    contents: &str,
    format: ConfigFormat,
    path: &Path,
) -> Result<ConfigFile, ConfigError> {
    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };
    match format {
        ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| parse_err(e.to_string())),
        ConfigFormat::Toml => toml::from_str(contents).map_err(|e| parse_err(e.to_string())),
        ConfigFormat::Json => serde_json::from_str(contents).map_err(|e| parse_err(e.to_string())),
    }
}

/// Reads and decodes a config file. Runs before logging is set up, so it
/// reports only through its error.
pub fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_config(&contents, ConfigFormat::from_path(path), path)
}

impl ConfigFile {
    /// Fills unset fields in a fixed order: base URL, port, job names, job
    /// statuses. Fields that already hold a value are left alone, so calling
    /// this twice is the same as calling it once. A job status of 0 counts as
    /// unset.
    pub fn apply_defaults(&mut self) {
        if self.base_url.as_deref().map_or(true, str::is_empty) {
            warn!(
                field = "base_url",
                default = DEFAULT_BASE_URL,
                "config warning: config.base_url not set, using default."
            );
            self.base_url = Some(DEFAULT_BASE_URL.to_string());
        }

        if self.port.is_none() {
            warn!(
                field = "port",
                default = DEFAULT_PORT,
                "config warning: config.port not set, using default."
            );
            self.port = Some(DEFAULT_PORT);
        }

        for (index, job) in self.jobs.iter_mut().enumerate() {
            if job.name.as_deref().map_or(true, str::is_empty) {
                let name = format!("job_{index}");
                warn!(field = "name", default = %name, "config warning: job name not set, using default.");
                job.name = Some(name);
            }
            match job.status {
                None => job.status = Some(DEFAULT_STATUS),
                Some(0) => {
                    warn!(
                        field = "status",
                        job = %job.label(index),
                        default = DEFAULT_STATUS,
                        "config warning: job status is 0, using default."
                    );
                    job.status = Some(DEFAULT_STATUS);
                }
                Some(_) => {}
            }
        }
    }

    /// Loads and parses the body file of every `read_file` job. Relative paths
    /// are taken from `base_dir`. Jobs that already hold a loaded body are
    /// skipped; jobs with no path are left for validation to reject.
    pub fn load_body_files(&mut self, base_dir: &Path) -> Result<(), ConfigError> {
        for (index, job) in self.jobs.iter_mut().enumerate() {
            if !job.read_file || job.json_body.is_some() || job.body_source().is_empty() {
                continue;
            }

            let path = resolve_body_path(base_dir, job.body_source());
            let contents = fs::read_to_string(&path).map_err(|e| ConfigError::BodyFileRead {
                job: job.label(index),
                path: path.clone(),
                source: e,
            })?;
            let parsed: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&contents)
                .map_err(|e| ConfigError::BodyFileParse {
                    job: job.label(index),
                    path: path.clone(),
                    source: e,
                })?;

            info!(job = %job.label(index), path = ?path, "Loaded expected body from file.");
            job.file_contents = Some(contents);
            job.json_body = Some(serde_json::Value::Object(parsed));
        }
        Ok(())
    }

    /// The startup defaulting pass: plain defaults first, then body files.
    pub fn init(&mut self, base_dir: &Path) -> Result<(), ConfigError> {
        self.apply_defaults();
        self.load_body_files(base_dir)
    }
}

/// Directory that relative body-file paths in `config_path` are taken from.
pub fn config_dir(config_path: &Path) -> &Path {
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

fn resolve_body_path(base_dir: &Path, body: &str) -> PathBuf {
    let path = Path::new(body);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// What a job expects back in the response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedBody {
    Literal(String),
    /// Loaded from `path` at startup. Matching uses the raw `contents`; the
    /// parsed `json` is only for display.
    File {
        path: PathBuf,
        contents: String,
        json: serde_json::Value,
    },
}

impl ExpectedBody {
    pub fn text(&self) -> &str {
        match self {
            ExpectedBody::Literal(text) => text,
            ExpectedBody::File { contents, .. } => contents,
        }
    }

    /// Human-readable form for verbose failure output.
    pub fn render(&self) -> String {
        match self {
            ExpectedBody::Literal(text) => text.clone(),
            ExpectedBody::File { json, .. } => {
                serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub name: String,
    pub description: Option<String>,
    pub endpoint: String,
    pub expected_status: u16,
    pub expected_body: ExpectedBody,
}

/// Resolved, validated configuration. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub schedule: Duration,
    pub base_url: String,
    pub port: u16,
    pub verbose: bool,
    pub fail_fast: bool,
    pub timeout: Option<Duration>,
    pub log_dir: Option<PathBuf>,
    pub jobs: Vec<Job>,
}

impl Config {
    /// Runs the defaulting pass and validation over a parsed file.
    pub fn from_file(mut file: ConfigFile, base_dir: &Path) -> Result<Self, ConfigError> {
        file.init(base_dir)?;
        validate(&file)?;

        let jobs = file
            .jobs
            .into_iter()
            .enumerate()
            .map(|(index, job)| {
                let expected_status = job.expected_status();
                let expected_body = match (job.read_file, job.json_body, job.file_contents) {
                    (true, Some(json), Some(contents)) => ExpectedBody::File {
                        path: resolve_body_path(base_dir, job.body.as_deref().unwrap_or_default()),
                        contents,
                        json,
                    },
                    _ => ExpectedBody::Literal(job.body.unwrap_or_default()),
                };
                Job {
                    name: job.name.unwrap_or_else(|| format!("job_{index}")),
                    description: job.description.filter(|d| !d.is_empty()),
                    endpoint: job.endpoint.unwrap_or_default(),
                    expected_status,
                    expected_body,
                }
            })
            .collect();

        let config = Config {
            schedule: Duration::from_millis(file.schedule.unwrap_or_default()),
            base_url: file.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            port: file.port.unwrap_or(DEFAULT_PORT),
            verbose: file.verbose,
            fail_fast: file.fail_fast,
            timeout: file.timeout_ms.filter(|ms| *ms > 0).map(Duration::from_millis),
            log_dir: file.log_dir.map(PathBuf::from),
            jobs,
        };
        info!(
            target_url = %config.target(),
            schedule_ms = config.schedule.as_millis() as u64,
            jobs = config.jobs.len(),
            "Loaded config successfully."
        );
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = read_config_file(path)?;
        Self::from_file(file, config_dir(path))
    }

    /// Scheme, host and port every job URL starts with.
    pub fn target(&self) -> String {
        format!("{}:{}", self.base_url.trim_end_matches('/'), self.port)
    }

    /// `target()` followed by the endpoint, with exactly one `/` between them.
    pub fn job_url(&self, job: &Job) -> String {
        if job.endpoint.starts_with('/') {
            format!("{}{}", self.target(), job.endpoint)
        } else {
            format!("{}/{}", self.target(), job.endpoint)
        }
    }
}
