// system-tests/tests/suites/forecast.rs
// ============================================================================
// Module: Forecast Tests
// Description: Live checks for `GET /v1/forecast`.
// Purpose: Confirm coordinate echo, metric catalogue, and numeric points.
// Dependencies: system-tests helpers, twincheck-validator
// ============================================================================

//! Live checks for the forecast endpoint.

use std::error::Error;

use helpers::artifacts::TestReporter;
use helpers::readiness::READY_TIMEOUT;
use helpers::readiness::wait_for_service_ready;
use helpers::session::live_config;
use helpers::session::run_live;
use twincheck_contract::Endpoint;
use twincheck_contract::ForecastQuery;
use twincheck_contract::Service;
use twincheck_validator::Credential;

use crate::helpers;

#[test]
fn forecast_echoes_coordinates_and_metrics() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("forecast_echoes_coordinates_and_metrics")?;
    let config = live_config()?;
    wait_for_service_ready(&config, Service::Forecast, READY_TIMEOUT)?;
    let forecast = run_live(&reporter, &config, |validator, config| {
        validator.forecast(&ForecastQuery {
            longitude: config.forecast.longitude,
            latitude: config.forecast.latitude,
        })
    })?;
    reporter.artifacts().write_json("forecast.json", &forecast)?;
    let metrics: Vec<&str> =
        forecast.data.metrics.iter().map(|metric| metric.name.as_str()).collect();
    reporter.finish(
        "pass",
        vec![
            format!("metrics: {}", metrics.join(", ")),
            format!("{} points", forecast.data.points.len()),
        ],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "transcript.json".to_string(),
            "forecast.json".to_string(),
        ],
    )?;
    Ok(())
}

#[test]
fn forecast_rejects_missing_token() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("forecast_rejects_missing_token")?;
    let config = live_config()?;
    wait_for_service_ready(&config, Service::Forecast, READY_TIMEOUT)?;
    let envelope = run_live(&reporter, &config, |validator, _| {
        validator.expect_unauthorized(Endpoint::Forecast, &Credential::Absent)
    })?;
    reporter.pass(format!("missing token -> {}", envelope.error.code))?;
    Ok(())
}
