// crates/twincheck-contract/src/catalog.rs
// ============================================================================
// Module: Schema Catalogue
// Description: JSON Schema documents for every record the APIs return.
// Purpose: Centralize response schemas so each assertion is defined once.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Record-level schemas (entities, relationships, measurements, pages, error
//! envelopes) and the composite response schemas built from them. The endpoint
//! table in [`crate::endpoints`] refers to the composite schemas only.
//!
//! Subschemas are inlined rather than shared through `$ref` so every error
//! location resolves against the document it came from.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Metric names every forecast response must carry, in the metrics list and on each point.
pub const FORECAST_REQUIRED_METRICS: [&str; 3] =
    ["dryBulbTemperature", "wetBulbTemperature", "relativeHumidity"];

/// Dialect declared by every response schema.
pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

// ============================================================================
// SECTION: Record Schemas
// ============================================================================

/// Typed numeric observation: `{value, measurementType}`.
#[must_use]
pub fn measurement_schema() -> Value {
    json!({
        "type": "object",
        "required": ["value", "measurementType"],
        "properties": {
            "value": {},
            "measurementType": {"type": "string"}
        }
    })
}

/// Graph entity: `{id, type, attributes, state?}` plus type-specific attribute rules.
#[must_use]
pub fn entity_schema() -> Value {
    let rules: Vec<Value> = entity_attribute_rules().iter().map(AttributeRule::clause).collect();
    json!({
        "type": "object",
        "required": ["id", "type", "attributes"],
        "properties": {
            "id": {"type": "string"},
            "type": {"type": "string"},
            "attributes": {"type": "object"},
            "state": {"type": "object"}
        },
        "allOf": rules
    })
}

/// Directed graph edge: `{id, source, target, type}`.
#[must_use]
pub fn relationship_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "source", "target", "type"],
        "properties": {
            "id": {"type": "string"},
            "source": {"type": "string", "minLength": 1},
            "target": {"type": "string", "minLength": 1},
            "type": {"type": "string"}
        }
    })
}

/// Page metadata; `nextCursor` is an opaque string, or null on the last page.
#[must_use]
pub fn page_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "nextCursor": {"type": ["string", "null"]}
        }
    })
}

/// Error envelope carried by every response with status >= 400.
#[must_use]
pub fn error_envelope_schema() -> Value {
    json!({
        "$schema": SCHEMA_DIALECT,
        "title": "error_envelope",
        "type": "object",
        "required": ["error"],
        "properties": {
            "error": {
                "type": "object",
                "required": ["code", "message"],
                "properties": {
                    "code": {"type": "string"},
                    "message": {"type": "string"}
                }
            }
        }
    })
}

// ============================================================================
// SECTION: Response Schemas
// ============================================================================

/// `GET /model` response.
#[must_use]
pub fn twin_model_schema() -> Value {
    json!({
        "$schema": SCHEMA_DIALECT,
        "title": "twin_model",
        "type": "object",
        "required": ["entityTypes", "measurements", "relationships"],
        "properties": {
            "entityTypes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "entityType"],
                    "properties": {
                        "id": {},
                        "entityType": {"type": "string"}
                    }
                }
            },
            "measurements": {"type": "array", "items": measurement_schema()},
            "relationships": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["relationshipType"],
                    "properties": {"relationshipType": {"type": "string"}}
                }
            }
        }
    })
}

/// `GET /details/{siteId}` response.
#[must_use]
pub fn site_details_schema() -> Value {
    json!({
        "$schema": SCHEMA_DIALECT,
        "title": "site_details",
        "type": "object",
        "required": ["siteId", "entities", "relationships", "page"],
        "properties": {
            "siteId": {"type": "string"},
            "entities": {"type": "array", "items": entity_schema()},
            "relationships": {"type": "array", "items": relationship_schema()},
            "page": page_schema()
        }
    })
}

/// `GET /ontology` response: a JSON-LD prefix-to-URI context.
#[must_use]
pub fn ontology_schema() -> Value {
    json!({
        "$schema": SCHEMA_DIALECT,
        "title": "ontology",
        "type": "object",
        "required": ["@context"],
        "properties": {
            "@context": {
                "type": "object",
                "additionalProperties": {"type": "string"}
            }
        }
    })
}

/// `GET /v1/forecast` response.
#[must_use]
pub fn forecast_schema() -> Value {
    let mut point_properties = Map::new();
    point_properties.insert("timestamp".to_string(), json!({"type": "string"}));
    for name in FORECAST_REQUIRED_METRICS {
        point_properties.insert(name.to_string(), json!({"type": "number"}));
    }
    let mut point_required = vec!["timestamp"];
    point_required.extend(FORECAST_REQUIRED_METRICS);
    json!({
        "$schema": SCHEMA_DIALECT,
        "title": "forecast",
        "type": "object",
        "required": ["data"],
        "properties": {
            "data": {
                "type": "object",
                "required": ["resource", "metrics", "points"],
                "properties": {
                    "resource": {
                        "type": "object",
                        "required": ["longitude", "latitude", "timezone", "elevation"],
                        "properties": {
                            "longitude": {"type": "number"},
                            "latitude": {"type": "number"},
                            "timezone": {},
                            "elevation": {}
                        }
                    },
                    "metrics": {
                        "type": "array",
                        "minItems": 1,
                        "items": {
                            "type": "object",
                            "required": ["name", "unit", "quantityKind", "description"],
                            "properties": {"name": {"type": "string"}}
                        }
                    },
                    "points": {
                        "type": "array",
                        "minItems": 1,
                        "items": {
                            "type": "object",
                            "required": point_required,
                            "properties": Value::Object(point_properties)
                        }
                    }
                }
            }
        }
    })
}

// ============================================================================
// SECTION: Entity Attribute Rules
// ============================================================================

/// Type-specific attribute constraint applied to entities in detail responses.
///
/// # Invariants
/// - The rule only fires when the entity `type` equals `entity_type` and the
///   attribute is present; absent attributes are never a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeRule {
    /// Entity type the rule applies to.
    pub entity_type: &'static str,
    /// Attribute key inside `attributes`.
    pub attribute: &'static str,
    /// Schema the attribute value must satisfy.
    pub schema: Value,
}

impl AttributeRule {
    /// Returns the `if`/`then` clause enforcing the rule inside an entity schema.
    #[must_use]
    pub fn clause(&self) -> Value {
        let mut attribute = Map::new();
        attribute.insert(self.attribute.to_string(), self.schema.clone());
        json!({
            "if": {
                "required": ["type"],
                "properties": {"type": {"const": self.entity_type}}
            },
            "then": {
                "properties": {
                    "attributes": {"properties": Value::Object(attribute)}
                }
            }
        })
    }
}

/// Returns the attribute rules embedded in every entity schema.
#[must_use]
pub fn entity_attribute_rules() -> Vec<AttributeRule> {
    vec![
        AttributeRule {
            entity_type: "SiteType",
            attribute: "siteId",
            schema: json!({"type": "string"}),
        },
        AttributeRule {
            entity_type: "PowerDeviceType",
            attribute: "ratedPower",
            schema: measurement_schema(),
        },
    ]
}

// ============================================================================
// SECTION: Tests
// ============================================================================
