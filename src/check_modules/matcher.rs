//! Pure predicates deciding whether one HTTP response meets a job's expectations.
use super::config::Job;
use super::validation::NOT_FOUND_STATUS;

pub fn status_matches(job: &Job, observed_status: u16) -> bool {
    observed_status == job.expected_status
}

/// An empty response, or a job expecting 404, always passes. Otherwise the
/// body must equal the expected text byte for byte.
pub fn body_matches(job: &Job, observed_body: &[u8]) -> bool {
    if observed_body.is_empty() || job.expected_status == NOT_FOUND_STATUS {
        return true;
    }
    observed_body == job.expected_body.text().as_bytes()
}

/// Result of checking one response. Status is checked first; a status
/// mismatch skips the body check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    StatusMismatch,
    BodyMismatch,
}

pub fn evaluate(job: &Job, observed_status: u16, observed_body: &[u8]) -> Verdict {
    if !status_matches(job, observed_status) {
        Verdict::StatusMismatch
    } else if !body_matches(job, observed_body) {
        Verdict::BodyMismatch
    } else {
        Verdict::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check_modules::config::ExpectedBody;
    use std::path::PathBuf;

    fn job(status: u16, body: &str) -> Job {
        Job {
            name: "health".to_string(),
            description: None,
            endpoint: "/health".to_string(),
            expected_status: status,
            expected_body: ExpectedBody::Literal(body.to_string()),
        }
    }

    #[test]
    fn test_status_must_be_exact() {
        let j = job(200, "OK");
        assert!(status_matches(&j, 200));
        assert!(!status_matches(&j, 201));
        assert!(!status_matches(&j, 500));
    }

    #[test]
    fn test_body_is_compared_verbatim() {
        let j = job(200, "OK");
        assert!(body_matches(&j, b"OK"));
        assert!(!body_matches(&j, b"OK\n"));
        assert!(!body_matches(&j, b"ok"));
    }

    #[test]
    fn test_empty_body_always_matches() {
        assert!(body_matches(&job(200, "OK"), b""));
    }

    #[test]
    fn test_not_found_jobs_waive_body_check() {
        let j = job(404, "");
        assert!(body_matches(&j, b"<html>Not Found</html>"));
        let j = job(404, "expected");
        assert!(body_matches(&j, b"something else"));
    }

    #[test]
    fn test_status_failure_short_circuits() {
        let j = job(200, "OK");
        assert_eq!(evaluate(&j, 500, b"OK"), Verdict::StatusMismatch);
        assert_eq!(evaluate(&j, 500, b"nope"), Verdict::StatusMismatch);
        assert_eq!(evaluate(&j, 200, b"nope"), Verdict::BodyMismatch);
        assert_eq!(evaluate(&j, 200, b"OK"), Verdict::Pass);
    }

    #[test]
    fn test_file_body_compares_raw_contents_not_json() {
        let j = Job {
            expected_body: ExpectedBody::File {
                path: PathBuf::from("expected.json"),
                contents: "{\"a\":1}".to_string(),
                json: serde_json::json!({"a": 1}),
            },
            ..job(200, "")
        };
        assert!(body_matches(&j, b"{\"a\":1}"));
        // Semantically equal JSON with different whitespace is still a mismatch.
        assert!(!body_matches(&j, b"{\"a\": 1}"));
        assert!(!body_matches(&j, b"expected.json"));
    }
}
