//! Kernel-wide error type for construction and configuration failures
//!
//! Domain crates carry their own error enums; [`CoreError`] covers the
//! failures that happen before a domain is reachable at all, such as a
//! malformed configuration value at startup. It converts into [`PortError`]
//! so adapters can surface it through the port taxonomy.

use thiserror::Error;

use crate::ports::PortError;

/// Errors raised by kernel-level construction and configuration
#[derive(Debug, Error)]
pub enum CoreError {
    /// A value failed structural validation
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// A configuration key is missing or holds an unusable value
    #[error("configuration '{key}': {message}")]
    Configuration { key: String, message: String },
}

impl CoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Configuration {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<CoreError> for PortError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation { field, message } => PortError::Validation {
                message,
                field: Some(field),
            },
            CoreError::Configuration { .. } => PortError::Internal {
                message: error.to_string(),
                source: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_the_key() {
        let err = CoreError::configuration("database.url", "must not be empty");
        assert_eq!(
            err.to_string(),
            "configuration 'database.url': must not be empty"
        );
    }

    #[test]
    fn test_validation_converts_with_field() {
        let port: PortError = CoreError::validation("account_number", "too short").into();
        match port {
            PortError::Validation { field, message } => {
                assert_eq!(field.as_deref(), Some("account_number"));
                assert_eq!(message, "too short");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_configuration_converts_to_internal() {
        let port: PortError = CoreError::configuration("api.jwt_secret", "unset").into();
        assert!(matches!(port, PortError::Internal { .. }));
    }
}
