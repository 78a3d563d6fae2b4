//! Runs every configured job once, in order, and collects the outcomes.
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::config::{Config, Job};
use super::error::CheckError;
use super::matcher::{evaluate, Verdict};
use super::reporter::{CycleReport, Failure, FailureReason, Outcome};

/// Counts left over from a reported cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl From<&CycleReport<'_>> for CycleSummary {
    fn from(report: &CycleReport<'_>) -> Self {
        Self {
            total: report.total(),
            succeeded: report.success_count(),
            failed: report.failure_count(),
        }
    }
}

pub struct CheckRunner {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl CheckRunner {
    pub fn new(config: Arc<Config>) -> Result<Self, CheckError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(CheckError::Client)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Checks all jobs sequentially. A failing job never stops the cycle; only
    /// a transport error with `fail_fast` set is returned as an error.
    pub async fn run_cycle(&self) -> Result<CycleReport<'_>, CheckError> {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(self.config.jobs.len());

        for job in &self.config.jobs {
            outcomes.push(self.check_job(job).await?);
        }

        Ok(CycleReport {
            started_at,
            elapsed: start.elapsed(),
            outcomes,
        })
    }

    /// One full cycle followed by its report.
    pub async fn run_and_report(&self) -> Result<CycleSummary, CheckError> {
        let report = self.run_cycle().await?;
        report.emit(self.config.verbose);
        Ok(CycleSummary::from(&report))
    }

    async fn check_job<'a>(&self, job: &'a Job) -> Result<Outcome<'a>, CheckError> {
        info!(job = %job.name, "Running: {}", job.name);
        if self.config.verbose {
            if let Some(description) = &job.description {
                info!(job = %job.name, "{description}");
            }
        }

        let url = self.config.job_url(job);
        let (status, body) = match self.fetch(&url).await {
            Ok(response) => response,
            Err(e) if self.config.fail_fast => {
                let source = e.into_source();
                error!(job = %job.name, url = %url, error = %source, "Request failed, stopping.");
                return Err(CheckError::Transport {
                    job: job.name.clone(),
                    url,
                    source,
                });
            }
            Err(FetchError::Send(e)) => {
                warn!(job = %job.name, url = %url, error = %e, "Request failed.");
                return Ok(Outcome::Failure(Failure {
                    job,
                    observed_status: None,
                    observed_body: Vec::new(),
                    reason: FailureReason::Unreachable(e.to_string()),
                }));
            }
            Err(FetchError::Body { status, source }) => {
                warn!(job = %job.name, url = %url, status, error = %source, "Failed to read response body.");
                return Ok(Outcome::Failure(Failure {
                    job,
                    observed_status: Some(status),
                    observed_body: Vec::new(),
                    reason: FailureReason::BodyUnreadable(source.to_string()),
                }));
            }
        };
        debug!(job = %job.name, status, bytes = body.len(), "Received response.");

        let outcome = match evaluate(job, status, &body) {
            Verdict::Pass => Outcome::Success(job),
            Verdict::StatusMismatch => Outcome::Failure(Failure {
                job,
                observed_status: Some(status),
                observed_body: body,
                reason: FailureReason::StatusMismatch {
                    expected: job.expected_status,
                    received: status,
                },
            }),
            Verdict::BodyMismatch => Outcome::Failure(Failure {
                job,
                observed_status: Some(status),
                observed_body: body,
                reason: FailureReason::BodyMismatch,
            }),
        };
        Ok(outcome)
    }

    async fn fetch(&self, url: &str) -> Result<(u16, Vec<u8>), FetchError> {
        let response = self.client.get(url).send().await.map_err(FetchError::Send)?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Body { status, source })?;
        Ok((status, body.to_vec()))
    }
}

/// Where a request broke off: before any response, or while reading the body
/// of a response whose status already arrived.
enum FetchError {
    Send(reqwest::Error),
    Body { status: u16, source: reqwest::Error },
}

impl FetchError {
    fn into_source(self) -> reqwest::Error {
        match self {
            FetchError::Send(source) | FetchError::Body { source, .. } => source,
        }
    }
}
