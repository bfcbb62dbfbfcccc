// crates/twincheck-config/src/env.rs
// ============================================================================
// Module: Config Environment
// Description: Environment-backed overrides for validator configuration.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 and empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::config::ConfigError;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys recognized by the validator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEnv {
    /// Path to `twincheck.toml`.
    ConfigPath,
    /// Datacenter API base URL.
    BaseUrl,
    /// Datacenter API bearer token.
    AuthToken,
    /// Forecast API base URL.
    ForecastUrl,
    /// Forecast API bearer token.
    ForecastToken,
    /// Request timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Accept self-signed TLS certificates (`true`/`false` or `1`/`0`).
    AcceptInvalidCerts,
}

impl ConfigEnv {
    /// Returns every key, in documentation order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::ConfigPath,
            Self::BaseUrl,
            Self::AuthToken,
            Self::ForecastUrl,
            Self::ForecastToken,
            Self::TimeoutSeconds,
            Self::AcceptInvalidCerts,
        ]
    }

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "TWINCHECK_CONFIG",
            Self::BaseUrl => "TWINCHECK_BASE_URL",
            Self::AuthToken => "TWINCHECK_AUTH_TOKEN",
            Self::ForecastUrl => "TWINCHECK_FORECAST_URL",
            Self::ForecastToken => "TWINCHECK_FORECAST_TOKEN",
            Self::TimeoutSeconds => "TWINCHECK_TIMEOUT_SEC",
            Self::AcceptInvalidCerts => "TWINCHECK_ACCEPT_INVALID_CERTS",
        }
    }

    /// Reads the variable, rejecting invalid UTF-8 and empty values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the value is not UTF-8 or is blank.
    pub fn read(self) -> Result<Option<String>, ConfigError> {
        read_env_nonempty(self.as_str())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{name} must be valid UTF-8")))
    })
}

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Invalid(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive number of seconds into milliseconds.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
pub(crate) fn parse_timeout_seconds(name: &str, raw: &str) -> Result<u64, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|_| {
        ConfigError::Invalid(format!("{name} must be a positive integer number of seconds"))
    })?;
    if secs == 0 {
        return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
    }
    Ok(secs.saturating_mul(1_000))
}

/// Parses a boolean literal (`true`/`false`/`1`/`0`).
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
pub(crate) fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(ConfigError::Invalid(format!("{name} must be 1, 0, true, or false")))
}
