// crates/twincheck-validator/src/session.rs
// ============================================================================
// Module: Validator Session
// Description: Session-scoped ownership of the per-service HTTP clients.
// Purpose: Construct clients and schemas once and share them across checks.
// Dependencies: tracing, twincheck-config, twincheck-contract
// ============================================================================

//! ## Overview
//! A [`ValidatorSession`] owns one [`ServiceClient`] per service, the
//! transcript they write to, and the compiled contract schemas. Checks borrow
//! them through
//! [`ValidatorSession::validator`]; the clients are released when the session
//! is closed or dropped. [`with_session`] wraps the construct-use-release
//! sequence in a single call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::debug;
use tracing::info;
use twincheck_config::ValidatorConfig;
use twincheck_contract::ContractSchemas;
use twincheck_contract::ForecastQuery;
use twincheck_contract::Service;

use crate::client::ServiceClient;
use crate::client::Transcript;
use crate::client::TranscriptEntry;
use crate::error::ValidationError;
use crate::validator::ContractValidator;

// ============================================================================
// SECTION: Session
// ============================================================================

/// Shared HTTP context for one validation run.
#[derive(Debug)]
pub struct ValidatorSession {
    /// Configuration the session was opened with.
    config: ValidatorConfig,
    /// Datacenter twin API client.
    datacenter: ServiceClient,
    /// Forecast API client.
    forecast: ServiceClient,
    /// Transcript shared by both clients.
    transcript: Transcript,
    /// Site used for auth checks against `/details/{siteId}`.
    auth_site: String,
    /// Response and error envelope schemas, compiled once per session.
    schemas: ContractSchemas,
}

impl ValidatorSession {
    /// Validates `config`, compiles the contract schemas, and builds both
    /// service clients.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Config`] when the configuration is invalid,
    /// [`ValidationError::Schema`] when a contract schema does not compile,
    /// and [`ValidationError::Client`] when a client cannot be built.
    pub fn open(config: &ValidatorConfig) -> Result<Self, ValidationError> {
        config.validate().map_err(|err| ValidationError::Config(err.to_string()))?;
        let auth_site = config
            .catalog
            .primary_site()
            .ok_or_else(|| ValidationError::Config("no valid site ids configured".to_string()))?
            .to_string();
        let schemas =
            ContractSchemas::compile().map_err(|err| ValidationError::Schema(err.to_string()))?;
        let transcript = Transcript::new();
        let datacenter = ServiceClient::new(
            Service::Datacenter,
            &config.datacenter.base_url,
            &config.datacenter.auth_token,
            &config.http,
            transcript.clone(),
        )?;
        let forecast = ServiceClient::new(
            Service::Forecast,
            &config.forecast.base_url,
            &config.forecast.auth_token,
            &config.http,
            transcript.clone(),
        )?;
        info!(
            datacenter = %config.datacenter.base_url,
            forecast = %config.forecast.base_url,
            timeout_ms = config.http.timeout_ms,
            "validator session opened"
        );
        Ok(Self {
            config: config.clone(),
            datacenter,
            forecast,
            transcript,
            auth_site,
            schemas,
        })
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Returns a validator borrowing this session's clients.
    #[must_use]
    pub fn validator(&self) -> ContractValidator<'_> {
        ContractValidator::new(
            &self.datacenter,
            &self.forecast,
            &self.auth_site,
            ForecastQuery {
                longitude: self.config.forecast.longitude,
                latitude: self.config.forecast.latitude,
            },
            &self.schemas,
        )
    }

    /// Releases the clients and returns the recorded transcript.
    #[must_use]
    pub fn close(self) -> Vec<TranscriptEntry> {
        self.transcript.entries()
    }
}

impl Drop for ValidatorSession {
    fn drop(&mut self) {
        debug!(requests = self.transcript.len(), "validator session released");
    }
}

/// Opens a session, runs `f`, and closes the session.
///
/// The session is released even when `f` panics.
///
/// # Errors
///
/// Returns [`ValidationError`] when the session cannot be opened.
pub fn with_session<T, F>(
    config: &ValidatorConfig,
    f: F,
) -> Result<(T, Vec<TranscriptEntry>), ValidationError>
where
    F: FnOnce(&ValidatorSession) -> T,
{
    let session = ValidatorSession::open(config)?;
    let output = f(&session);
    Ok((output, session.close()))
}
