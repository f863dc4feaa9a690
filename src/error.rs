//! Error types and handling for the `StoreCheck` application

use thiserror::Error;

use crate::geolocation::GeolocationError;

/// Main error type for the `StoreCheck` application
#[derive(Error, Debug)]
pub enum StoreCheckError {
    /// The platform offers no location capability at all
    #[error("Geolocation is not supported on this platform")]
    GeolocationUnsupported,

    /// The geolocation provider answered with an error
    #[error("Geolocation failed: {reason}")]
    GeolocationFailed { reason: GeolocationError },

    /// Catalog loading or validation errors
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl StoreCheckError {
    /// Create a new catalog error
    pub fn catalog<S: Into<String>>(message: S) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            StoreCheckError::GeolocationUnsupported => "Geolocation not supported".to_string(),
            StoreCheckError::GeolocationFailed { reason } => {
                format!("Error getting location: {reason}")
            }
            StoreCheckError::Catalog { message } => {
                format!("The store list could not be loaded: {message}")
            }
            StoreCheckError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            StoreCheckError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<GeolocationError> for StoreCheckError {
    fn from(reason: GeolocationError) -> Self {
        Self::GeolocationFailed { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let catalog_err = StoreCheckError::catalog("duplicate id");
        assert!(matches!(catalog_err, StoreCheckError::Catalog { .. }));

        let config_err = StoreCheckError::config("bad zoom");
        assert!(matches!(config_err, StoreCheckError::Config { .. }));
    }

    #[test]
    fn test_user_messages() {
        let unsupported = StoreCheckError::GeolocationUnsupported;
        assert_eq!(unsupported.user_message(), "Geolocation not supported");

        let failed: StoreCheckError = GeolocationError::PermissionDenied.into();
        assert!(failed.user_message().starts_with("Error getting location:"));
        assert!(failed.user_message().contains("denied"));

        let catalog_err = StoreCheckError::catalog("entry 3 has no name");
        assert!(catalog_err.user_message().contains("entry 3 has no name"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StoreCheckError = io_err.into();
        assert!(matches!(err, StoreCheckError::Io { .. }));
    }
}
