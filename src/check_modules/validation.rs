use super::config::ConfigFile;
use super::error::ConfigError;

/// Status code for jobs that expect the resource to be absent; these need no body.
pub const NOT_FOUND_STATUS: u16 = 404;

/// Checks a parsed (and normally defaulted) config for missing mandatory
/// fields. Returns the first violation in this order: schedule, port, then for
/// each job its endpoint followed by its expected body.
pub fn validate(config: &ConfigFile) -> Result<(), ConfigError> {
    if config.schedule.unwrap_or(0) == 0 {
        return Err(ConfigError::ScheduleNotSet);
    }

    if config.port == Some(0) {
        return Err(ConfigError::InvalidPort);
    }

    for (index, job) in config.jobs.iter().enumerate() {
        if job.endpoint.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::JobEndpointNotSet {
                job: job.label(index),
            });
        }

        if job.body_source().is_empty() && job.expected_status() != NOT_FOUND_STATUS {
            return Err(ConfigError::EmptyExpectedBody {
                job: job.label(index),
            });
        }
    }

    Ok(())
}
