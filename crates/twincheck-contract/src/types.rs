// crates/twincheck-contract/src/types.rs
// ============================================================================
// Module: Contract Types
// Description: Typed records and request parameters for the validated APIs.
// Purpose: Give schema-checked responses a strongly typed view.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Records here mirror the JSON bodies of the datacenter and forecast APIs.
//! They are decoded after the schema check, so decode failures indicate a
//! contract gap rather than routine malformed input. Unknown keys are kept in
//! flattened `extra` maps where the APIs are open-ended.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Error Taxonomy
// ============================================================================

/// Error classes the APIs signal through status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Malformed cursor or parameters (400).
    BadRequest,
    /// Missing or invalid credential (401).
    Unauthorized,
    /// Unknown resource identifier (404).
    NotFound,
}

impl ApiErrorKind {
    /// Returns the HTTP status code for the error class.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
        }
    }

    /// Maps a status code to its error class, if documented.
    #[must_use]
    pub const fn from_status(status: u16) -> Option<Self> {
        match status {
            400 => Some(Self::BadRequest),
            401 => Some(Self::Unauthorized),
            404 => Some(Self::NotFound),
            _ => None,
        }
    }

    /// Returns a stable label for the error class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
        }
    }
}

/// Error envelope: `{error: {code, message}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Error payload.
    pub error: ErrorBody,
}

/// Inner error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

// ============================================================================
// SECTION: Pagination
// ============================================================================

/// Opaque pagination cursor.
///
/// # Invariants
/// - The value is never parsed or inspected; it is only replayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wraps a cursor string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw cursor string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Page metadata on detail responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Cursor for the next page, when more results exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
    /// Other page keys reported by the server.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// ============================================================================
// SECTION: Request Parameters
// ============================================================================

/// Query parameters accepted by `GET /details/{siteId}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailsQuery {
    /// Restrict entities to one type.
    pub entity_type: Option<String>,
    /// Maximum entities per page.
    pub limit: Option<u32>,
    /// Continuation cursor from a previous page.
    pub cursor: Option<Cursor>,
}

impl DetailsQuery {
    /// Returns a query with no filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entity type filter.
    #[must_use]
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Sets the page size limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the continuation cursor.
    #[must_use]
    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Returns the query string pairs in wire order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(entity_type) = &self.entity_type {
            pairs.push(("entityType", entity_type.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(cursor) = &self.cursor {
            pairs.push(("cursor", cursor.as_str().to_string()));
        }
        pairs
    }
}

/// Query parameters accepted by `GET /v1/forecast`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastQuery {
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
}

impl ForecastQuery {
    /// Returns the query string pairs in wire order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("longitude", self.longitude.to_string()), ("latitude", self.latitude.to_string())]
    }
}

// ============================================================================
// SECTION: Datacenter Records
// ============================================================================

/// Typed observation `{value, measurementType}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// Observed value.
    pub value: Value,
    /// Measurement type name (for example `ActivePower`).
    pub measurement_type: String,
    /// Other keys reported by the server.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Entity type entry in the twin model catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTypeEntry {
    /// Catalogue identifier.
    pub id: Value,
    /// Entity type name.
    pub entity_type: String,
    /// Other keys reported by the server.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Relationship type entry in the twin model catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipTypeEntry {
    /// Relationship type name.
    pub relationship_type: String,
    /// Other keys reported by the server.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// `GET /model` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinModel {
    /// Entity types recognized by the API.
    pub entity_types: Vec<EntityTypeEntry>,
    /// Measurement catalogue.
    pub measurements: Vec<Measurement>,
    /// Relationship types recognized by the API.
    pub relationships: Vec<RelationshipTypeEntry>,
}

/// Graph entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Entity identifier.
    pub id: String,
    /// Entity type name.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Free-form attributes.
    pub attributes: Map<String, Value>,
    /// Optional runtime state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Map<String, Value>>,
}

impl EntityRecord {
    /// Decodes a measurement-valued attribute, if present and well formed.
    #[must_use]
    pub fn measurement(&self, attribute: &str) -> Option<Measurement> {
        self.attributes.get(attribute).and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

/// Directed edge between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// Relationship identifier.
    pub id: String,
    /// Source entity identifier.
    pub source: String,
    /// Target entity identifier.
    pub target: String,
    /// Relationship type name.
    #[serde(rename = "type")]
    pub relationship_type: String,
}

/// `GET /details/{siteId}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDetails {
    /// Echo of the requested site.
    pub site_id: String,
    /// Entities on this page.
    pub entities: Vec<EntityRecord>,
    /// Relationships on this page.
    pub relationships: Vec<RelationshipRecord>,
    /// Page metadata.
    pub page: PageInfo,
}

impl SiteDetails {
    /// Returns entities of the given type.
    pub fn entities_of_type<'a>(
        &'a self,
        entity_type: &'a str,
    ) -> impl Iterator<Item = &'a EntityRecord> + 'a {
        self.entities.iter().filter(move |entity| entity.entity_type == entity_type)
    }

    /// Returns relationships of the given type.
    pub fn relationships_of_type<'a>(
        &'a self,
        relationship_type: &'a str,
    ) -> impl Iterator<Item = &'a RelationshipRecord> + 'a {
        self.relationships.iter().filter(move |rel| rel.relationship_type == relationship_type)
    }
}

/// `GET /ontology` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ontology {
    /// Prefix-to-URI namespace mapping.
    #[serde(rename = "@context")]
    pub context: BTreeMap<String, String>,
}

// ============================================================================
// SECTION: Forecast Records
// ============================================================================

/// `GET /v1/forecast` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    /// Forecast payload.
    pub data: ForecastData,
}

/// Forecast payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastData {
    /// Location the forecast applies to.
    pub resource: ForecastResource,
    /// Metric descriptors.
    pub metrics: Vec<ForecastMetric>,
    /// Time series points.
    pub points: Vec<ForecastPoint>,
}

/// Forecast location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResource {
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Timezone as reported by the server.
    pub timezone: Value,
    /// Elevation as reported by the server.
    pub elevation: Value,
}

/// Forecast metric descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastMetric {
    /// Metric name, also used as the key on each point.
    pub name: String,
    /// Unit as reported by the server.
    pub unit: Value,
    /// Quantity kind as reported by the server.
    pub quantity_kind: Value,
    /// Description as reported by the server.
    pub description: Value,
}

/// Forecast time series point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Point timestamp.
    pub timestamp: String,
    /// Metric values keyed by metric name.
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}
