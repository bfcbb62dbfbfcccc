// crates/twincheck-config/src/config.rs
// ============================================================================
// Module: Validator Configuration
// Description: Configuration loading and validation for the contract validator.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `TWINCHECK_*` environment overrides. The merged record is validated
//! once; invalid values fail closed before any request is issued.
//! Bearer tokens are never rendered by [`ValidatorConfig::redacted`] output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::defaults;
use crate::env::ConfigEnv;
use crate::env::parse_bool;
use crate::env::parse_timeout_seconds;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "twincheck.toml";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a bearer token.
pub(crate) const MAX_TOKEN_LENGTH: usize = 8192;
/// Upper bound for `pagination.max_limit`.
pub(crate) const MAX_PAGE_LIMIT: u32 = 10_000;
/// Lower bound for `http.timeout_ms`.
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Upper bound for `http.timeout_ms`.
pub(crate) const MAX_TIMEOUT_MS: u64 = 600_000;
/// Lower bound for `http.max_response_bytes`.
pub(crate) const MIN_RESPONSE_BYTES: usize = 1024;
/// Upper bound for `http.max_response_bytes`.
pub(crate) const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
/// Placeholder rendered in place of bearer tokens.
pub const REDACTED: &str = "<redacted>";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Complete validator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Datacenter twin API target.
    pub datacenter: DatacenterTarget,
    /// Forecast API target.
    pub forecast: ForecastTarget,
    /// Known-good and known-bad catalogue values.
    pub catalog: CatalogConfig,
    /// Page size settings.
    pub pagination: PaginationConfig,
    /// HTTP client settings.
    pub http: HttpConfig,
}

/// Datacenter twin API target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatacenterTarget {
    /// Base URL (scheme, host, optional port and path prefix).
    pub base_url: String,
    /// Bearer token accepted by the service.
    pub auth_token: String,
    /// Token the service must reject.
    pub invalid_token: String,
}

impl Default for DatacenterTarget {
    fn default() -> Self {
        Self {
            base_url: defaults::DATACENTER_BASE_URL.to_string(),
            auth_token: defaults::DATACENTER_AUTH_TOKEN.to_string(),
            invalid_token: defaults::INVALID_AUTH_TOKEN.to_string(),
        }
    }
}

/// Forecast API target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastTarget {
    /// Base URL of the forecast service.
    pub base_url: String,
    /// Bearer token accepted by the service.
    pub auth_token: String,
    /// Sample longitude queried by the suite.
    pub longitude: f64,
    /// Sample latitude queried by the suite.
    pub latitude: f64,
}

impl Default for ForecastTarget {
    fn default() -> Self {
        Self {
            base_url: defaults::FORECAST_BASE_URL.to_string(),
            auth_token: defaults::FORECAST_AUTH_TOKEN.to_string(),
            longitude: defaults::FORECAST_LONGITUDE,
            latitude: defaults::FORECAST_LATITUDE,
        }
    }
}

/// Catalogue values used to drive parameterized checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Site identifiers expected to exist.
    pub valid_site_ids: Vec<String>,
    /// Site identifiers expected to be rejected.
    pub invalid_site_ids: Vec<String>,
    /// Entity types exercised by the filter check.
    pub entity_types: Vec<String>,
    /// Relationship types known to the twin model.
    pub relationship_types: Vec<String>,
    /// Measurement types known to the twin model.
    pub measurement_types: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            valid_site_ids: defaults::owned(defaults::VALID_SITE_IDS),
            invalid_site_ids: defaults::owned(defaults::INVALID_SITE_IDS),
            entity_types: defaults::owned(defaults::ENTITY_TYPES),
            relationship_types: defaults::owned(defaults::RELATIONSHIP_TYPES),
            measurement_types: defaults::owned(defaults::MEASUREMENT_TYPES),
        }
    }
}

impl CatalogConfig {
    /// Returns the first valid site identifier.
    #[must_use]
    pub fn primary_site(&self) -> Option<&str> {
        self.valid_site_ids.first().map(String::as_str)
    }
}

/// Page size settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Default page size.
    pub default_limit: u32,
    /// Largest page size the API accepts.
    pub max_limit: u32,
    /// Page size used by the pagination round trip.
    pub round_trip_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: defaults::DEFAULT_LIMIT,
            max_limit: defaults::MAX_LIMIT,
            round_trip_limit: defaults::ROUND_TRIP_LIMIT,
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Accept self-signed or otherwise invalid TLS certificates.
    pub accept_invalid_certs: bool,
    /// Maximum response body size in bytes.
    pub max_response_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: defaults::TIMEOUT_MS,
            accept_invalid_certs: false,
            max_response_bytes: defaults::MAX_RESPONSE_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl ValidatorConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// Resolution order: explicit `path`, `TWINCHECK_CONFIG`, then
    /// `twincheck.toml` in the working directory when it exists. With no file,
    /// built-in defaults are used. Environment overrides apply last.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match resolve_path(path)? {
            Some(resolved) => Self::read_file(&resolved)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a TOML document without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file with size and encoding limits, without validation.
    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies `TWINCHECK_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an override value is malformed.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = ConfigEnv::BaseUrl.read()? {
            self.datacenter.base_url = value;
        }
        if let Some(value) = ConfigEnv::AuthToken.read()? {
            self.datacenter.auth_token = value;
        }
        if let Some(value) = ConfigEnv::ForecastUrl.read()? {
            self.forecast.base_url = value;
        }
        if let Some(value) = ConfigEnv::ForecastToken.read()? {
            self.forecast.auth_token = value;
        }
        if let Some(value) = ConfigEnv::TimeoutSeconds.read()? {
            self.http.timeout_ms =
                parse_timeout_seconds(ConfigEnv::TimeoutSeconds.as_str(), &value)?;
        }
        if let Some(value) = ConfigEnv::AcceptInvalidCerts.read()? {
            self.http.accept_invalid_certs =
                parse_bool(ConfigEnv::AcceptInvalidCerts.as_str(), &value)?;
        }
        Ok(())
    }

    /// Returns a copy with every bearer token replaced by a placeholder.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        REDACTED.clone_into(&mut copy.datacenter.auth_token);
        REDACTED.clone_into(&mut copy.datacenter.invalid_token);
        REDACTED.clone_into(&mut copy.forecast.auth_token);
        copy
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

impl ValidatorConfig {
    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.datacenter.validate()?;
        self.forecast.validate()?;
        self.catalog.validate()?;
        self.pagination.validate()?;
        self.http.validate()
    }
}

impl DatacenterTarget {
    /// Validates URL and token settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_base_url("datacenter.base_url", &self.base_url)?;
        validate_token("datacenter.auth_token", &self.auth_token)?;
        validate_token("datacenter.invalid_token", &self.invalid_token)?;
        if self.invalid_token == self.auth_token {
            return Err(ConfigError::Invalid(
                "datacenter.invalid_token must differ from datacenter.auth_token".to_string(),
            ));
        }
        Ok(())
    }
}

impl ForecastTarget {
    /// Validates URL, token, and coordinate settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_base_url("forecast.base_url", &self.base_url)?;
        validate_token("forecast.auth_token", &self.auth_token)?;
        validate_coordinate("forecast.longitude", self.longitude, 180.0)?;
        validate_coordinate("forecast.latitude", self.latitude, 90.0)
    }
}

impl CatalogConfig {
    /// Validates catalogue lists.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.valid_site_ids.is_empty() {
            return Err(ConfigError::Invalid(
                "catalog.valid_site_ids must not be empty".to_string(),
            ));
        }
        let valid = unique_set("catalog.valid_site_ids", &self.valid_site_ids)?;
        if valid.contains("") {
            return Err(ConfigError::Invalid(
                "catalog.valid_site_ids must not contain an empty id".to_string(),
            ));
        }
        let invalid = unique_set("catalog.invalid_site_ids", &self.invalid_site_ids)?;
        if let Some(overlap) = valid.intersection(&invalid).next() {
            return Err(ConfigError::Invalid(format!(
                "site id {overlap} is listed as both valid and invalid"
            )));
        }
        for (field, values) in [
            ("catalog.entity_types", &self.entity_types),
            ("catalog.relationship_types", &self.relationship_types),
            ("catalog.measurement_types", &self.measurement_types),
        ] {
            unique_set(field, values)?;
            if values.iter().any(|value| value.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!("{field} must not contain empty values")));
            }
        }
        Ok(())
    }
}

impl PaginationConfig {
    /// Validates page size relationships.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_limit == 0 || self.max_limit > MAX_PAGE_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "pagination.max_limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        for (field, value) in [
            ("pagination.default_limit", self.default_limit),
            ("pagination.round_trip_limit", self.round_trip_limit),
        ] {
            if value == 0 || value > self.max_limit {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be between 1 and pagination.max_limit"
                )));
            }
        }
        Ok(())
    }
}

impl HttpConfig {
    /// Validates timeout and body limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "http.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if !(MIN_RESPONSE_BYTES ..= MAX_RESPONSE_BYTES).contains(&self.max_response_bytes) {
            return Err(ConfigError::Invalid(format!(
                "http.max_response_bytes must be between {MIN_RESPONSE_BYTES} and \
                 {MAX_RESPONSE_BYTES}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI, environment, or the default filename.
fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Some(env_path) = ConfigEnv::ConfigPath.read()? {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default.is_file().then_some(default))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a service base URL.
fn validate_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|err| ConfigError::Invalid(format!("{field} is not a valid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!("{field} must use http or https")));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::Invalid(format!("{field} must include a host")));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(ConfigError::Invalid(format!("{field} must not embed credentials")));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::Invalid(format!("{field} must not carry a query or fragment")));
    }
    Ok(())
}

/// Validates a bearer token value.
fn validate_token(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
    }
    if value.len() > MAX_TOKEN_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if value.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
        return Err(ConfigError::Invalid(format!(
            "{field} must not contain whitespace or control characters"
        )));
    }
    Ok(())
}

/// Validates a coordinate is finite and within `[-bound, bound]`.
fn validate_coordinate(field: &str, value: f64, bound: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value.abs() > bound {
        return Err(ConfigError::Invalid(format!("{field} must be within [-{bound}, {bound}]")));
    }
    Ok(())
}

/// Collects values into a set, rejecting duplicates.
fn unique_set<'a>(field: &str, values: &'a [String]) -> Result<BTreeSet<&'a str>, ConfigError> {
    let mut seen = BTreeSet::new();
    for value in values {
        if !seen.insert(value.as_str()) {
            return Err(ConfigError::Invalid(format!("{field} contains duplicate value {value}")));
        }
    }
    Ok(seen)
}
