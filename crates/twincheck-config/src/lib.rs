// crates/twincheck-config/src/lib.rs
// ============================================================================
// Module: Twincheck Config Library
// Description: Canonical validator configuration model and validation.
// Purpose: Single source of truth for twincheck.toml semantics.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! `twincheck-config` defines [`ValidatorConfig`], the explicit configuration
//! record passed to the contract validator. Values come from built-in
//! defaults, an optional `twincheck.toml`, and `TWINCHECK_*` environment
//! overrides, in that order. Validation is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod defaults;
pub mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::CatalogConfig;
pub use config::ConfigError;
pub use config::DatacenterTarget;
pub use config::ForecastTarget;
pub use config::HttpConfig;
pub use config::PaginationConfig;
pub use config::ValidatorConfig;
pub use env::ConfigEnv;
pub use env::read_env_strict;
