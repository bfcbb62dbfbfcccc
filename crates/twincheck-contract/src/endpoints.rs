// crates/twincheck-contract/src/endpoints.rs
// ============================================================================
// Module: Endpoint Contracts
// Description: Endpoint catalogue mapping each API route to its contract.
// Purpose: Keep route, status, and response schema definitions in one table.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`Endpoint`] enumerates the routes under validation and [`contract_for`]
//! resolves each to an [`EndpointContract`]. The order of [`Endpoint::all`] is
//! the canonical order used in reports and in `twincheck contracts` output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::catalog::forecast_schema;
use crate::catalog::ontology_schema;
use crate::catalog::site_details_schema;
use crate::catalog::twin_model_schema;
use crate::types::ApiErrorKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path segments of the datacenter twin API root (`/twin/datacenter/v1`).
pub const DATACENTER_API_SEGMENTS: [&str; 3] = ["twin", "datacenter", "v1"];

// ============================================================================
// SECTION: Endpoint Types
// ============================================================================

/// Upstream service an endpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// Datacenter digital-twin entity-graph API.
    Datacenter,
    /// Weather forecast API.
    Forecast,
}

impl Service {
    /// Returns a stable label for the service.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Datacenter => "datacenter",
            Self::Forecast => "forecast",
        }
    }
}

/// Routes validated by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// `GET /twin/datacenter/v1/model`.
    TwinModel,
    /// `GET /twin/datacenter/v1/details/{siteId}`.
    SiteDetails,
    /// `GET /twin/datacenter/v1/ontology`.
    Ontology,
    /// `GET /v1/forecast`.
    Forecast,
}

impl Endpoint {
    /// Returns every endpoint in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::TwinModel, Self::SiteDetails, Self::Ontology, Self::Forecast]
    }

    /// Returns a stable label for the endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TwinModel => "twin_model",
            Self::SiteDetails => "site_details",
            Self::Ontology => "ontology",
            Self::Forecast => "forecast",
        }
    }

    /// Returns the owning service.
    #[must_use]
    pub const fn service(self) -> Service {
        match self {
            Self::TwinModel | Self::SiteDetails | Self::Ontology => Service::Datacenter,
            Self::Forecast => Service::Forecast,
        }
    }

    /// Returns the documented path template.
    #[must_use]
    pub const fn path_template(self) -> &'static str {
        match self {
            Self::TwinModel => "/twin/datacenter/v1/model",
            Self::SiteDetails => "/twin/datacenter/v1/details/{siteId}",
            Self::Ontology => "/twin/datacenter/v1/ontology",
            Self::Forecast => "/v1/forecast",
        }
    }

    /// Returns the fixed path segments, excluding any `{siteId}` parameter.
    #[must_use]
    pub fn segments(self) -> Vec<&'static str> {
        let mut segments = DATACENTER_API_SEGMENTS.to_vec();
        match self {
            Self::TwinModel => segments.push("model"),
            Self::SiteDetails => segments.push("details"),
            Self::Ontology => segments.push("ontology"),
            Self::Forecast => segments = vec!["v1", "forecast"],
        }
        segments
    }

    /// Returns true when the route takes a `{siteId}` path parameter.
    #[must_use]
    pub const fn takes_site_id(self) -> bool {
        matches!(self, Self::SiteDetails)
    }
}

// ============================================================================
// SECTION: Contracts
// ============================================================================

/// Expected behaviour of a single endpoint.
///
/// # Invariants
/// - `success_status` responses must satisfy `response_schema`.
/// - Every status in `error_kinds` must carry the error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointContract {
    /// Endpoint identifier.
    pub endpoint: Endpoint,
    /// Owning service.
    pub service: Service,
    /// HTTP method.
    pub method: &'static str,
    /// Documented path template.
    pub path_template: &'static str,
    /// Supported query parameters.
    pub query_params: Vec<&'static str>,
    /// Whether a bearer token is required.
    pub requires_auth: bool,
    /// Status code of a successful response.
    pub success_status: u16,
    /// Documented error classes.
    pub error_kinds: Vec<ApiErrorKind>,
    /// JSON Schema of a successful response body.
    pub response_schema: Value,
}

/// Returns the contract for one endpoint.
#[must_use]
pub fn contract_for(endpoint: Endpoint) -> EndpointContract {
    let (query_params, requires_auth, error_kinds, response_schema) = match endpoint {
        Endpoint::TwinModel => {
            (Vec::new(), true, vec![ApiErrorKind::Unauthorized], twin_model_schema())
        }
        Endpoint::SiteDetails => (
            vec!["entityType", "limit", "cursor"],
            true,
            vec![ApiErrorKind::BadRequest, ApiErrorKind::Unauthorized, ApiErrorKind::NotFound],
            site_details_schema(),
        ),
        Endpoint::Ontology => {
            (Vec::new(), true, vec![ApiErrorKind::Unauthorized], ontology_schema())
        }
        Endpoint::Forecast => (
            vec!["longitude", "latitude"],
            true,
            vec![ApiErrorKind::BadRequest, ApiErrorKind::Unauthorized],
            forecast_schema(),
        ),
    };
    EndpointContract {
        endpoint,
        service: endpoint.service(),
        method: "GET",
        path_template: endpoint.path_template(),
        query_params,
        requires_auth,
        success_status: 200,
        error_kinds,
        response_schema,
    }
}

/// Returns every endpoint contract in canonical order.
#[must_use]
pub fn endpoint_contracts() -> Vec<EndpointContract> {
    Endpoint::all().iter().copied().map(contract_for).collect()
}
