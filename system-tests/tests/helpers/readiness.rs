// system-tests/tests/helpers/readiness.rs
// ============================================================================
// Module: Readiness Helpers
// Description: Readiness checks for the live datacenter and forecast APIs.
// Purpose: Ensure targets are reachable without arbitrary sleeps.
// Dependencies: twincheck-validator
// ============================================================================

use std::thread::sleep;
use std::time::Duration;
use std::time::Instant;

use twincheck_config::ValidatorConfig;
use twincheck_contract::Endpoint;
use twincheck_contract::ForecastQuery;
use twincheck_contract::Service;
use twincheck_validator::Credential;
use twincheck_validator::ServiceClient;
use twincheck_validator::Transcript;

/// Default time allowed for a target to become reachable.
pub const READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Polls a cheap endpoint until any HTTP response arrives or timeout expires.
pub fn wait_for_service_ready(
    config: &ValidatorConfig,
    service: Service,
    timeout: Duration,
) -> Result<(), String> {
    let (base_url, token) = match service {
        Service::Datacenter => (&config.datacenter.base_url, &config.datacenter.auth_token),
        Service::Forecast => (&config.forecast.base_url, &config.forecast.auth_token),
    };
    let client = ServiceClient::new(service, base_url, token, &config.http, Transcript::new())
        .map_err(|err| err.to_string())?;
    let (endpoint, query) = match service {
        Service::Datacenter => (Endpoint::TwinModel, Vec::new()),
        Service::Forecast => (
            Endpoint::Forecast,
            ForecastQuery {
                longitude: config.forecast.longitude,
                latitude: config.forecast.latitude,
            }
            .query_pairs(),
        ),
    };
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        match client.get(endpoint, None, &query, &Credential::Configured) {
            Ok(_) => return Ok(()),
            Err(err) => {
                if start.elapsed() > timeout {
                    return Err(format!(
                        "{} readiness timeout after {attempts} attempts: {err}",
                        service.as_str()
                    ));
                }
                sleep(Duration::from_millis(250));
            }
        }
    }
}
