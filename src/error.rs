//! Error types for submission sessions.
//!
//! These cover misuse of the API and bad configuration. A message that could
//! not be delivered is not an error in this sense: it is reported as an
//! [`Outcome`](crate::Outcome) through the session observer.

use std::io;

use thiserror::Error;

use crate::session::SessionState;

/// Errors returned by the session controller and its handles.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A controller accepts exactly one send call for its lifetime.
    #[error("A submission was already started on this session (state: {state})")]
    AlreadyStarted { state: SessionState },

    /// The task driving the session has finished.
    #[error("Session is no longer running")]
    Closed,
}

/// Errors that can occur while loading or validating a [`SessionConfig`](crate::SessionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required configuration field is missing.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A configuration value is invalid.
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// The configuration file could not be read.
    #[error("I/O error reading configuration: {0}")]
    Io(#[from] io::Error),

    /// The configuration file is not valid TOML for a session.
    #[error("Unable to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;

    use super::*;

    #[test]
    fn test_session_error_display() {
        let err = SessionError::AlreadyStarted {
            state: SessionState::Sending,
        };
        assert_eq!(
            err.to_string(),
            "A submission was already started on this session (state: Sending)"
        );
        assert_eq!(SessionError::Closed.to_string(), "Session is no longer running");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingField("host");
        assert_eq!(err.to_string(), "Missing required field: host");

        let err = ConfigError::InvalidConfiguration {
            field: "port".to_string(),
            reason: "must be between 1-65535".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration for port: must be between 1-65535"
        );
    }

    #[test]
    fn test_config_error_source_chain() {
        let err = ConfigError::from(io::Error::new(io::ErrorKind::NotFound, "no such file"));
        assert!(err.source().is_some());
        assert_eq!(
            err.to_string(),
            "I/O error reading configuration: no such file"
        );
    }
}
