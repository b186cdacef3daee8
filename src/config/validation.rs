//! Configuration validation.
//!
//! Semantic checks only; serde handles syntax. All problems are reported,
//! not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::HammerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &HammerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.pool.queue_capacity == 0 {
        errors.push(ValidationError::new("pool.queue_capacity", "must be at least 1"));
    }
    if config.pool.output_capacity == 0 {
        errors.push(ValidationError::new("pool.output_capacity", "must be at least 1"));
    }
    if config.pool.collection_timeout_ms == 0 {
        errors.push(ValidationError::new("pool.collection_timeout_ms", "must be greater than 0"));
    }

    if config.retry.base_delay_ms > config.retry.max_delay_ms {
        errors.push(ValidationError::new(
            "retry.base_delay_ms",
            "must not exceed retry.max_delay_ms",
        ));
    }

    let bc = &config.providers.blockcypher;
    if bc.enabled {
        check_provider(&mut errors, "providers.blockcypher", &bc.base_url, bc.batch_limit, bc.hourly_limit);
    }
    let bl = &config.providers.blockonomics;
    if bl.enabled {
        check_provider(&mut errors, "providers.blockonomics", &bl.url, bl.batch_limit, bl.hourly_limit);
    }
    if !bc.enabled && !bl.enabled {
        errors.push(ValidationError::new("providers", "at least one provider must be enabled"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_provider(
    errors: &mut Vec<ValidationError>,
    prefix: &str,
    url: &str,
    batch_limit: usize,
    hourly_limit: Option<u32>,
) {
    if let Err(e) = Url::parse(url) {
        errors.push(ValidationError::new(&format!("{}.url", prefix), format!("invalid URL '{}': {}", url, e)));
    }
    if batch_limit == 0 {
        errors.push(ValidationError::new(&format!("{}.batch_limit", prefix), "must be at least 1"));
    }
    if hourly_limit == Some(0) {
        errors.push(ValidationError::new(&format!("{}.hourly_limit", prefix), "must be at least 1 when set"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&HammerConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = HammerConfig::default();
        config.pool.queue_capacity = 0;
        config.providers.blockcypher.batch_limit = 0;
        config.providers.blockcypher.hourly_limit = Some(0);
        config.providers.blockonomics.url = "not a url".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "pool.queue_capacity",
                "providers.blockcypher.batch_limit",
                "providers.blockcypher.hourly_limit",
                "providers.blockonomics.url",
            ]
        );
    }

    #[test]
    fn test_requires_a_provider() {
        let mut config = HammerConfig::default();
        config.providers.blockcypher.enabled = false;
        config.providers.blockonomics.enabled = false;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "providers");
    }

    #[test]
    fn test_disabled_provider_not_checked() {
        let mut config = HammerConfig::default();
        config.providers.blockonomics.enabled = false;
        config.providers.blockonomics.batch_limit = 0;
        assert!(validate_config(&config).is_ok());
    }
}
