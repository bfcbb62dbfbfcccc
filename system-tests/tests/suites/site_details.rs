// system-tests/tests/suites/site_details.rs
// ============================================================================
// Module: Site Details Tests
// Description: Live checks for `GET /twin/datacenter/v1/details/{siteId}`.
// Purpose: Confirm site echo, filtering, limits, pagination, and idempotence.
// Dependencies: system-tests helpers, twincheck-validator
// ============================================================================

//! ## Overview
//! Live checks for the site details endpoint.
//! Invariants:
//! - Every configured valid site returns 200 and echoes its `siteId`.
//! - `entityType` filters and `limit` bounds are honoured.
//! - Cursors are replayed verbatim; malformed cursors are rejected with 400.

use std::error::Error;

use helpers::artifacts::TestReporter;
use helpers::readiness::READY_TIMEOUT;
use helpers::readiness::wait_for_service_ready;
use helpers::session::live_config;
use helpers::session::run_live;
use twincheck_contract::Cursor;
use twincheck_contract::DetailsQuery;
use twincheck_contract::Service;
use twincheck_validator::ValidationError;
use twincheck_validator::suite::MALFORMED_CURSOR;

use crate::helpers;

/// Returns the first configured valid site.
fn primary_site(config: &twincheck_config::ValidatorConfig) -> Result<String, ValidationError> {
    config
        .catalog
        .primary_site()
        .map(str::to_string)
        .ok_or_else(|| ValidationError::Config("no valid site ids configured".to_string()))
}

#[test]
fn valid_sites_return_details() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("valid_sites_return_details")?;
    let config = live_config()?;
    wait_for_service_ready(&config, Service::Datacenter, READY_TIMEOUT)?;
    let notes = run_live(&reporter, &config, |validator, config| {
        let mut notes = Vec::new();
        for site_id in &config.catalog.valid_site_ids {
            let details = validator.site_details(site_id, &DetailsQuery::new())?;
            notes.push(format!(
                "{site_id}: {} entities, {} relationships",
                details.entities.len(),
                details.relationships.len()
            ));
        }
        Ok(notes)
    })?;
    reporter.finish(
        "pass",
        notes,
        vec!["summary.json".to_string(), "summary.md".to_string(), "transcript.json".to_string()],
    )?;
    Ok(())
}

#[test]
fn entity_type_filter_returns_only_matching_entities() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("entity_type_filter_returns_only_matching_entities")?;
    let config = live_config()?;
    wait_for_service_ready(&config, Service::Datacenter, READY_TIMEOUT)?;
    let checked = run_live(&reporter, &config, |validator, config| {
        let site_id = primary_site(config)?;
        for entity_type in &config.catalog.entity_types {
            let query = DetailsQuery::new()
                .with_entity_type(entity_type)
                .with_limit(config.pagination.default_limit);
            validator.site_details(&site_id, &query)?;
        }
        Ok(config.catalog.entity_types.len())
    })?;
    reporter.pass(format!("{checked} entity type filters honoured"))?;
    Ok(())
}

#[test]
fn max_limit_bounds_entity_count() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("max_limit_bounds_entity_count")?;
    let config = live_config()?;
    wait_for_service_ready(&config, Service::Datacenter, READY_TIMEOUT)?;
    let count = run_live(&reporter, &config, |validator, config| {
        let site_id = primary_site(config)?;
        let query = DetailsQuery::new().with_limit(config.pagination.max_limit);
        Ok(validator.site_details(&site_id, &query)?.entities.len())
    })?;
    reporter.pass(format!("{count} entities within max limit {}", config.pagination.max_limit))?;
    Ok(())
}

#[test]
fn pagination_cursor_round_trip() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("pagination_cursor_round_trip")?;
    let config = live_config()?;
    wait_for_service_ready(&config, Service::Datacenter, READY_TIMEOUT)?;
    let outcome = run_live(&reporter, &config, |validator, config| {
        let site_id = primary_site(config)?;
        validator.pagination_round_trip(&site_id, config.pagination.round_trip_limit)
    })?;
    reporter.artifacts().write_json("pagination.json", &outcome)?;
    let replayed = outcome.second_page_entities.map_or_else(
        || "no cursor returned".to_string(),
        |count| format!("replayed page {count} entities"),
    );
    reporter.finish(
        "pass",
        vec![format!("first page {} entities, {replayed}", outcome.first_page_entities)],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "transcript.json".to_string(),
            "pagination.json".to_string(),
        ],
    )?;
    Ok(())
}

#[test]
fn repeated_requests_keep_shape() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("repeated_requests_keep_shape")?;
    let config = live_config()?;
    wait_for_service_ready(&config, Service::Datacenter, READY_TIMEOUT)?;
    let keys = run_live(&reporter, &config, |validator, config| {
        let site_id = primary_site(config)?;
        validator.idempotent_shape(&site_id, &DetailsQuery::new())
    })?;
    let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
    reporter.pass(format!("stable top-level keys: {}", keys.join(", ")))?;
    Ok(())
}

#[test]
fn malformed_cursor_is_rejected() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("malformed_cursor_is_rejected")?;
    let config = live_config()?;
    wait_for_service_ready(&config, Service::Datacenter, READY_TIMEOUT)?;
    let envelope = run_live(&reporter, &config, |validator, config| {
        let site_id = primary_site(config)?;
        validator.expect_cursor_rejected(&site_id, &Cursor::new(MALFORMED_CURSOR))
    })?;
    reporter.pass(format!("malformed cursor rejected with code {}", envelope.error.code))?;
    Ok(())
}
