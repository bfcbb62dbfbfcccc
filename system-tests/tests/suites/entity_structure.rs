// system-tests/tests/suites/entity_structure.rs
// ============================================================================
// Module: Entity Structure Tests
// Description: Live attribute checks for site and power device entities.
// Purpose: Confirm typed attributes survive on real datasets.
// Dependencies: system-tests helpers, twincheck-validator
// ============================================================================

//! ## Overview
//! Live entity attribute checks.
//! Invariants:
//! - `SiteType` entities carry a string `siteId` attribute.
//! - `PowerDeviceType.ratedPower`, when present, is a measurement object.

use std::error::Error;

use helpers::artifacts::TestReporter;
use helpers::readiness::READY_TIMEOUT;
use helpers::readiness::wait_for_service_ready;
use helpers::session::live_config;
use helpers::session::run_live;
use twincheck_contract::DetailsQuery;
use twincheck_contract::Service;

use crate::helpers;

#[test]
fn site_entities_carry_site_id() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("site_entities_carry_site_id")?;
    let config = live_config()?;
    wait_for_service_ready(&config, Service::Datacenter, READY_TIMEOUT)?;
    let checked = run_live(&reporter, &config, |validator, config| {
        let mut checked = 0;
        for site_id in &config.catalog.valid_site_ids {
            let details = validator.site_details(site_id, &DetailsQuery::new())?;
            checked += details.entities_of_type("SiteType").count();
        }
        Ok(checked)
    })?;
    reporter.pass(format!("{checked} SiteType entities checked"))?;
    Ok(())
}

#[test]
fn power_devices_report_rated_power_measurements() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("power_devices_report_rated_power_measurements")?;
    let config = live_config()?;
    wait_for_service_ready(&config, Service::Datacenter, READY_TIMEOUT)?;
    let ratings = run_live(&reporter, &config, |validator, config| {
        let mut ratings = Vec::new();
        for site_id in &config.catalog.valid_site_ids {
            let query = DetailsQuery::new().with_entity_type("PowerDeviceType");
            let details = validator.site_details(site_id, &query)?;
            ratings.extend(details.entities.iter().filter_map(|entity| {
                entity.measurement("ratedPower").map(|rated| (entity.id.clone(), rated))
            }));
        }
        Ok(ratings)
    })?;
    reporter.artifacts().write_json("rated_power.json", &ratings)?;
    reporter.finish(
        "pass",
        vec![format!("{} power devices report ratedPower", ratings.len())],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "transcript.json".to_string(),
            "rated_power.json".to_string(),
        ],
    )?;
    Ok(())
}
