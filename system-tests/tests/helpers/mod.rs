// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for twincheck system-tests.
// Purpose: Provide artifact, session, and readiness utilities.
// Dependencies: system-tests, twincheck-validator
// ============================================================================

//! ## Overview
//! Shared helpers for twincheck system-tests.
//! Invariants:
//! - Every live test waits for its service before issuing checks.
//! - Every live test writes `summary.json`, `summary.md`, and `transcript.json`.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod readiness;
