//! Configuration loading for pairchat.
//!
//! Settings come from the environment (`HOST`, `PORT`,
//! `PAIRCHAT_VALIDATION`), with CLI flags taking precedence.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 3000;

/// How the router treats malformed event payloads.
///
/// Lenient rejects bad events without mutating state and without any
/// client-visible response. Strict additionally emits an
/// `error-response` event to the offending connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Lenient,
    Strict,
}

impl ValidationMode {
    pub fn is_strict(self) -> bool {
        matches!(self, ValidationMode::Strict)
    }
}

impl FromStr for ValidationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(ValidationMode::Lenient),
            "strict" => Ok(ValidationMode::Strict),
            other => Err(Error::Config(format!(
                "invalid validation mode '{}' (expected 'lenient' or 'strict')",
                other
            ))),
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Lenient => write!(f, "lenient"),
            ValidationMode::Strict => write!(f, "strict"),
        }
    }
}

/// pairchat settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub validation: ValidationMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            validation: ValidationMode::default(),
        }
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults for
    /// unset variables.
    pub fn from_env() -> Result<Self> {
        let host = match std::env::var("HOST") {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => DEFAULT_HOST.to_string(),
        };

        let port = match std::env::var("PORT") {
            Ok(v) if !v.trim().is_empty() => v
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("invalid PORT '{}'", v.trim())))?,
            _ => DEFAULT_PORT,
        };

        let validation = match std::env::var("PAIRCHAT_VALIDATION") {
            Ok(v) if !v.trim().is_empty() => v.trim().parse()?,
            _ => ValidationMode::default(),
        };

        let settings = Self {
            host,
            port,
            validation,
        };
        settings.validate()?;

        tracing::debug!(
            "Loaded settings: {}:{} ({})",
            settings.host,
            settings.port,
            settings.validation
        );
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::Config("PORT must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Bind address in `host:port` form.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_mode_parsing() {
        assert_eq!(
            "lenient".parse::<ValidationMode>().unwrap(),
            ValidationMode::Lenient
        );
        assert_eq!(
            "STRICT".parse::<ValidationMode>().unwrap(),
            ValidationMode::Strict
        );
        assert!("chaotic".parse::<ValidationMode>().is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.bind_addr(), "0.0.0.0:3000");
        assert_eq!(settings.validation, ValidationMode::Lenient);
    }
}
