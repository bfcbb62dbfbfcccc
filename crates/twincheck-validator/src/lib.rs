// crates/twincheck-validator/src/lib.rs
// ============================================================================
// Module: Twincheck Validator Library
// Description: HTTP contract validation for the datacenter twin and forecast APIs.
// Purpose: Issue live requests and assert each endpoint honours its contract.
// Dependencies: reqwest, serde, serde_jcs, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! The validator is a client-side harness: it never serves the APIs, it only
//! exercises them. A [`ValidatorSession`] owns one blocking HTTP client per
//! service; a [`ContractValidator`] borrowed from the session runs individual
//! checks; a [`ContractSuite`] enumerates and runs every case derived from the
//! configuration and produces a [`SuiteReport`].
//!
//! Execution is single-threaded and synchronous. Nothing is retried.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod error;
pub mod report;
pub mod session;
pub mod suite;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::ApiResponse;
pub use client::Credential;
pub use client::ServiceClient;
pub use client::Transcript;
pub use client::TranscriptEntry;
pub use error::ValidationError;
pub use report::CaseOutcome;
pub use report::CaseStatus;
pub use report::ReportError;
pub use report::SuiteReport;
pub use report::write_transcript;
pub use session::ValidatorSession;
pub use session::with_session;
pub use suite::AuthMode;
pub use suite::ContractSuite;
pub use suite::ServiceSelection;
pub use suite::SuiteCase;
pub use validator::ContractValidator;
pub use validator::PaginationOutcome;
