//! Error types and handling for the weather aggregator

use thiserror::Error;

/// Main error type for the weather aggregator
#[derive(Error, Debug)]
pub enum AggregatorError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Malformed client requests
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A provider could not be reached or answered with something unreadable
    #[error("Upstream error from {provider}: {message}")]
    Upstream { provider: String, message: String },
}

impl AggregatorError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new upstream error for the named provider
    pub fn upstream<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AggregatorError::Config { .. } => {
                "Server configuration error. Please check the API keys.".to_string()
            }
            AggregatorError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            AggregatorError::Upstream { provider, .. } => {
                format!("Unable to reach weather provider '{provider}'.")
            }
        }
    }
}
