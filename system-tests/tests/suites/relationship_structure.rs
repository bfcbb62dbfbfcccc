// system-tests/tests/suites/relationship_structure.rs
// ============================================================================
// Module: Relationship Structure Tests
// Description: Live checks for relationship records in site details.
// Purpose: Confirm `feeds` edges name both endpoints.
// Dependencies: system-tests helpers, twincheck-validator
// ============================================================================

//! Live relationship checks for the site details endpoint.

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
fn feeds_relationships_name_source_and_target() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("feeds_relationships_name_source_and_target")?;
    let config = live_config()?;
    wait_for_service_ready(&config, Service::Datacenter, READY_TIMEOUT)?;
    let edges = run_live(&reporter, &config, |validator, config| {
        let mut edges = Vec::new();
        for site_id in &config.catalog.valid_site_ids {
            let details = validator.site_details(site_id, &DetailsQuery::new())?;
            edges.extend(
                details
                    .relationships_of_type("feeds")
                    .map(|rel| format!("{} -> {}", rel.source, rel.target)),
            );
        }
        Ok(edges)
    })?;
    reporter.artifacts().write_text("feeds.txt", &edges.join("\n"))?;
    reporter.finish(
        "pass",
        vec![format!("{} feeds relationships checked", edges.len())],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "transcript.json".to_string(),
            "feeds.txt".to_string(),
        ],
    )?;
    Ok(())
}
