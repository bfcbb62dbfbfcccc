// crates/twincheck-contract/src/lib.rs
// ============================================================================
// Module: Twincheck Contract Library
// Description: Endpoint contracts and their JSON Schema documents.
// Purpose: Single source of truth for what each API endpoint must return.
// Dependencies: jsonschema, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `twincheck-contract` defines the response contracts for the datacenter twin
//! API and the forecast API. Every endpoint maps to exactly one
//! [`EndpointContract`], whose draft 2020-12 JSON Schema is compiled into a
//! [`ContractSchema`] and applied by the validator. Typed records in [`types`]
//! are decoded only after a response has passed its schema check.
//!
//! Responses are untrusted input: schema validation checks the full document and
//! reports the offending JSON path instead of panicking.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod endpoints;
pub mod schema;
pub mod types;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::AttributeRule;
pub use catalog::FORECAST_REQUIRED_METRICS;
pub use catalog::SCHEMA_DIALECT;
pub use catalog::entity_attribute_rules;
pub use catalog::error_envelope_schema;
pub use catalog::measurement_schema;
pub use endpoints::DATACENTER_API_SEGMENTS;
pub use endpoints::Endpoint;
pub use endpoints::EndpointContract;
pub use endpoints::Service;
pub use endpoints::contract_for;
pub use endpoints::endpoint_contracts;
pub use schema::ContractSchema;
pub use schema::ContractSchemas;
pub use schema::SchemaError;
pub use schema::ShapeViolation;
pub use schema::ViolationKind;
pub use schema::child_path;
pub use schema::json_type_label;
pub use types::ApiErrorKind;
pub use types::Cursor;
pub use types::DetailsQuery;
pub use types::ForecastQuery;
