//! Per-cycle outcomes and the summary printed at the end of every cycle.
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

use super::config::Job;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    StatusMismatch { expected: u16, received: u16 },
    BodyMismatch,
    /// The request never produced a response (connection refused, DNS, timeout...).
    Unreachable(String),
    /// The status arrived but reading the body failed.
    BodyUnreadable(String),
}

#[derive(Debug, Clone)]
pub struct Failure<'a> {
    pub job: &'a Job,
    pub observed_status: Option<u16>,
    pub observed_body: Vec<u8>,
    pub reason: FailureReason,
}

impl fmt::Display for Failure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            FailureReason::StatusMismatch { expected, received } => {
                write!(f, "{}: Expected {expected} received {received}", self.job.name)
            }
            FailureReason::BodyMismatch => write!(f, "{}: Response body did not match", self.job.name),
            FailureReason::Unreachable(err) => write!(f, "{}: Unreachable: {err}", self.job.name),
            FailureReason::BodyUnreadable(err) => write!(
                f,
                "{}: Received {} but the body could not be read: {err}",
                self.job.name,
                self.observed_status.unwrap_or_default()
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Outcome<'a> {
    Success(&'a Job),
    Failure(Failure<'a>),
}

impl Outcome<'_> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// One printable line of a cycle report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Summary(String),
    Failure(String),
    Detail(String),
}

impl ReportLine {
    pub fn text(&self) -> &str {
        match self {
            ReportLine::Summary(text) | ReportLine::Failure(text) | ReportLine::Detail(text) => text,
        }
    }
}

/// Outcomes of one cycle, in job order. Dropped once reported.
#[derive(Debug)]
pub struct CycleReport<'a> {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub outcomes: Vec<Outcome<'a>>,
}

impl<'a> CycleReport<'a> {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.total() - self.success_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Failure<'a>> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Failure(failure) => Some(failure),
            Outcome::Success(_) => None,
        })
    }

    pub fn lines(&self, verbose: bool) -> Vec<ReportLine> {
        let total = self.total();
        let mut lines = vec![
            ReportLine::Summary(format!("{}/{total} Succeeded", self.success_count())),
            ReportLine::Summary(format!("{}/{total} Failed", self.failure_count())),
        ];

        for failure in self.failures() {
            lines.push(ReportLine::Failure(failure.to_string()));
            if verbose {
                let name = &failure.job.name;
                lines.push(ReportLine::Detail(format!("{name}: Expected body was:")));
                lines.push(ReportLine::Detail(failure.job.expected_body.render()));
                lines.push(ReportLine::Detail(format!("{name}: Received body was:")));
                lines.push(ReportLine::Detail(match failure.observed_status {
                    Some(_) => String::from_utf8_lossy(&failure.observed_body).into_owned(),
                    None => "<no response>".to_string(),
                }));
            }
        }
        lines
    }

    pub fn emit(&self, verbose: bool) {
        info!(
            started_at = %self.started_at.to_rfc3339(),
            elapsed_ms = self.elapsed.as_millis() as u64,
            succeeded = self.success_count(),
            failed = self.failure_count(),
            "--RESULTS--"
        );
        for line in self.lines(verbose) {
            match line {
                ReportLine::Summary(text) => info!("{text}"),
                ReportLine::Failure(text) => warn!("{text}"),
                ReportLine::Detail(text) => info!("{text}"),
            }
        }
    }
}
