// system-tests/tests/suites/contract_suite.rs
// ============================================================================
// Module: Contract Suite Run
// Description: Full contract suite against both live services.
// Purpose: Produce the same report artifacts as `twincheck run`.
// Dependencies: system-tests helpers, twincheck-validator
// ============================================================================

//! Full contract suite run with report and transcript artifacts.

use std::error::Error;

use helpers::artifacts::TestReporter;
use helpers::readiness::READY_TIMEOUT;
use helpers::readiness::wait_for_service_ready;
use helpers::session::live_config;
use twincheck_contract::Service;
use twincheck_validator::ContractSuite;
use twincheck_validator::ServiceSelection;
use twincheck_validator::with_session;
use twincheck_validator::write_transcript;

use crate::helpers;

#[test]
fn full_suite_passes_against_live_services() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("full_suite_passes_against_live_services")?;
    let config = live_config()?;
    wait_for_service_ready(&config, Service::Datacenter, READY_TIMEOUT)?;
    wait_for_service_ready(&config, Service::Forecast, READY_TIMEOUT)?;
    let (report, transcript) = with_session(&config, |session| {
        ContractSuite::from_config(session.config(), ServiceSelection::All).run(session)
    })?;
    let root = reporter.artifacts().root().to_path_buf();
    report.write_to(&root)?;
    write_transcript(&root, &transcript)?;

    let failures: Vec<String> =
        report.failures().map(|outcome| format!("{}: {}", outcome.name, outcome.message)).collect();
    let status = if failures.is_empty() { "pass" } else { "fail" };
    let mut notes = vec![format!("{}/{} cases passed", report.passed, report.total)];
    notes.extend(failures.iter().cloned());
    reporter.finish(
        status,
        notes,
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "report.json".to_string(),
            "report.md".to_string(),
            "transcript.json".to_string(),
        ],
    )?;
    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} contract cases failed: {}", failures.len(), failures.join("; ")).into())
    }
}
