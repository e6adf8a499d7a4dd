//! Static configuration shared by every session a factory creates.

use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, internal};

/// Connection and authentication settings for one submission endpoint.
///
/// ```toml
/// host = "smtp.example.com"
/// port = 465
/// encrypted_connect = true
/// authenticate = true
/// username = "alice"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Submission server host name.
    pub host: String,

    /// Submission server port.
    ///
    /// Default: 587
    #[serde(default = "defaults::port")]
    pub port: u16,

    /// Establish TLS before speaking SMTP (implicit TLS, usually port 465).
    #[serde(default)]
    pub encrypted_connect: bool,

    /// Upgrade a plain connection with `STARTTLS`.
    #[serde(default)]
    pub starttls: bool,

    /// Authenticate before submitting; the password is requested per session.
    #[serde(default)]
    pub authenticate: bool,

    /// User name presented during authentication.
    #[serde(default)]
    pub username: String,
}

mod defaults {
    pub const fn port() -> u16 {
        587
    }
}

impl SessionConfig {
    /// A plain, unauthenticated configuration for `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            encrypted_connect: false,
            starttls: false,
            authenticate: false,
            username: String::default(),
        }
    }

    /// Connect with implicit TLS.
    #[must_use]
    pub const fn with_encrypted_connect(mut self, encrypted: bool) -> Self {
        self.encrypted_connect = encrypted;
        self
    }

    /// Upgrade the connection with `STARTTLS`.
    #[must_use]
    pub const fn with_starttls(mut self, starttls: bool) -> Self {
        self.starttls = starttls;
        self
    }

    /// Require authentication as `username`.
    #[must_use]
    pub fn with_authentication(mut self, username: impl Into<String>) -> Self {
        self.authenticate = true;
        self.username = username.into();
        self
    }

    /// Parse and validate a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for a session, or if
    /// the resulting configuration fails [`validate`](Self::validate).
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold a valid
    /// session configuration.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(ConfigError::from)
            .with_context(|| format!("Unable to read {}", path.display()))?;

        Self::from_toml(&text).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Check that the configuration can describe a usable endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is empty or the port is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingField("host"));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidConfiguration {
                field: "port".to_string(),
                reason: "must be between 1-65535".to_string(),
            });
        }

        if self.authenticate && self.username.is_empty() {
            internal!(
                level = WARN,
                "Authentication is enabled for {} without a username",
                self.host
            );
        }

        if self.encrypted_connect && self.starttls {
            internal!(
                level = WARN,
                "Both implicit TLS and STARTTLS are enabled for {}",
                self.host
            );
        }

        Ok(())
    }
}
