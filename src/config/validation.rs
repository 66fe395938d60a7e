//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check downstream names are non-empty and unique
//! - Validate value ranges (attempts >= 1, multiplier >= 1.0, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use crate::config::schema::AppConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., "downstreams.auth.retry").
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(field: impl Into<String>, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

/// Validate an already-parsed configuration, collecting every problem.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(err(
            "listener.bind_address",
            format!("not a valid socket address: {}", config.listener.bind_address),
        ));
    }
    if config.listener.call_deadline_ms == 0 {
        errors.push(err("listener.call_deadline_ms", "must be greater than zero"));
    }

    let mut seen = HashSet::new();
    for downstream in &config.downstreams {
        let name = downstream.name.as_str();
        if name.is_empty() {
            errors.push(err("downstreams.name", "downstream name must not be empty"));
            continue;
        }
        if !seen.insert(name) {
            errors.push(err(
                format!("downstreams.{name}"),
                "duplicate downstream name",
            ));
        }

        if downstream.attempt_timeout_ms == 0 {
            errors.push(err(
                format!("downstreams.{name}.attempt_timeout_ms"),
                "must be greater than zero",
            ));
        }
        if downstream.breaker.failure_threshold == 0 {
            errors.push(err(
                format!("downstreams.{name}.breaker.failure_threshold"),
                "must be at least 1",
            ));
        }
        if downstream.breaker.half_open_max_trials == 0 {
            errors.push(err(
                format!("downstreams.{name}.breaker.half_open_max_trials"),
                "must be at least 1",
            ));
        }
        if downstream.retry.max_attempts == 0 {
            errors.push(err(
                format!("downstreams.{name}.retry.max_attempts"),
                "must be at least 1",
            ));
        }
        if downstream.retry.multiplier < 1.0 {
            errors.push(err(
                format!("downstreams.{name}.retry.multiplier"),
                "must be at least 1.0",
            ));
        }
        if downstream.retry.max_delay_ms < downstream.retry.base_delay_ms {
            errors.push(err(
                format!("downstreams.{name}.retry.max_delay_ms"),
                "must not be smaller than base_delay_ms",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::DownstreamConfig;

    #[test]
    fn default_config_is_valid() {
        let mut config = AppConfig::default();
        config.downstreams.push(DownstreamConfig::named("auth"));
        config.downstreams.push(DownstreamConfig::named("payment"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut config = AppConfig::default();
        config.downstreams.push(DownstreamConfig::named("auth"));
        config.downstreams.push(DownstreamConfig::named("auth"));
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("duplicate")));
    }

    #[test]
    fn all_errors_reported() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".into();
        let mut bad = DownstreamConfig::named("payment");
        bad.retry.max_attempts = 0;
        bad.retry.multiplier = 0.5;
        config.downstreams.push(bad);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
