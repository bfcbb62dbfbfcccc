// system-tests/src/lib.rs
// ============================================================================
// Module: Twincheck System Tests Library
// Description: Shared configuration for live contract system tests.
// Purpose: Provide common settings for the system-test binaries.
// Dependencies: twincheck-config
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the live system-test binaries
//! in `system-tests/tests`. Those binaries talk to real datacenter and forecast
//! endpoints and only build with the `system-tests` feature.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
