use crate::config::Config;
use crate::error::{Result, SonarError, ValidationError};
use crate::query::Ordering;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, reporting every problem at once
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_client(config, &mut errors);
        Self::validate_query(config, &mut errors);
        Self::validate_scope(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SonarError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_client(config: &Config, errors: &mut Vec<ValidationError>) {
        let address = config.client.base_address.trim();
        if address.is_empty() {
            errors.push(ValidationError::new(
                "client.base_address",
                "Base address cannot be empty",
            ));
        } else if !(address.starts_with("http://") || address.starts_with("https://")) {
            errors.push(ValidationError::new(
                "client.base_address",
                format!("Base address must be an http(s) URL, got '{}'", address),
            ));
        }

        if config.client.timeout_ms == 0 {
            errors.push(ValidationError::new(
                "client.timeout_ms",
                "Timeout must be greater than 0",
            ));
        }

        if config.client.api_version.trim().is_empty() {
            errors.push(ValidationError::new(
                "client.api_version",
                "API version cannot be empty",
            ));
        }

        if config.client.token_env.trim().is_empty() {
            errors.push(ValidationError::new(
                "client.token_env",
                "Token environment variable name cannot be empty",
            ));
        }
    }

    fn validate_query(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.query.default_limit == 0 {
            errors.push(ValidationError::new(
                "query.default_limit",
                "Default limit must be greater than 0",
            ));
        }

        if let Err(e) = config.query.default_ordering.parse::<Ordering>() {
            errors.push(ValidationError::new("query.default_ordering", e));
        }

        if config.query.default_property.trim().is_empty() {
            errors.push(ValidationError::new(
                "query.default_property",
                "Default property cannot be empty",
            ));
        }
    }

    fn validate_scope(config: &Config, errors: &mut Vec<ValidationError>) {
        if let Some(accession) = &config.scope.reference_accession {
            if accession.trim().is_empty() {
                errors.push(ValidationError::new(
                    "scope.reference_accession",
                    "Reference accession cannot be blank; omit it instead",
                ));
            }
        }
    }
}
