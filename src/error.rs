//! Error types and handling for `TravelMate`

use thiserror::Error;

/// Main error type for the `TravelMate` library and CLI
#[derive(Error, Debug)]
pub enum TravelError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors (network, HTTP status)
    #[error("API error: {message}")]
    Api { message: String },

    /// A lookup (geocoding, weather tier) found nothing
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Malformed data from an external service
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TravelError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new lookup failure
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TravelError::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            TravelError::NotFound { message } => {
                format!("Nothing found: {message}. Please try a different input.")
            }
            TravelError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TravelError::Parse { .. } => {
                "Received an unexpected response. Please try again.".to_string()
            }
            TravelError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for TravelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TravelError::parse(err.to_string())
        } else {
            TravelError::api(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TravelError {
    fn from(err: serde_json::Error) -> Self {
        TravelError::parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = TravelError::config("missing API key");
        assert!(matches!(config_err, TravelError::Config { .. }));

        let api_err = TravelError::api("connection failed");
        assert!(matches!(api_err, TravelError::Api { .. }));

        let not_found = TravelError::not_found("Atlantis");
        assert!(matches!(not_found, TravelError::NotFound { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = TravelError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = TravelError::api("test");
        assert!(api_err.user_message().contains("Unable to connect"));

        let not_found = TravelError::not_found("place 'Atlantis'");
        assert!(not_found.user_message().contains("Atlantis"));

        let validation_err = TravelError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let travel_err: TravelError = io_err.into();
        assert!(matches!(travel_err, TravelError::Io { .. }));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let travel_err: TravelError = json_err.into();
        assert!(matches!(travel_err, TravelError::Parse { .. }));
    }
}
