// crates/twincheck-validator/src/validator.rs
// ============================================================================
// Module: Contract Validator
// Description: Endpoint-level contract checks over live HTTP exchanges.
// Purpose: Turn each documented endpoint behaviour into a fallible check.
// Dependencies: serde, serde_json, tracing, twincheck-contract
// ============================================================================

//! ## Overview
//! [`ContractValidator`] borrows the session's service clients and exposes one
//! method per contract operation. Each method issues its own requests and
//! returns the decoded record on success or the first [`ValidationError`].
//! Invariants:
//! - Success responses are checked against the endpoint's compiled response
//!   schema in full; every array element is visited.
//! - Entity attribute rules are part of the details schema.
//! - Every expected error response must carry the error envelope.
//! - Cursors are replayed verbatim and never inspected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use twincheck_contract::ContractSchemas;
use twincheck_contract::Cursor;
use twincheck_contract::DetailsQuery;
use twincheck_contract::Endpoint;
use twincheck_contract::FORECAST_REQUIRED_METRICS;
use twincheck_contract::ForecastQuery;
use twincheck_contract::Service;
use twincheck_contract::ShapeViolation;
use twincheck_contract::ViolationKind;
use twincheck_contract::contract_for;
use twincheck_contract::json_type_label;
use twincheck_contract::types::ErrorEnvelope;
use twincheck_contract::types::ForecastResponse;
use twincheck_contract::types::Ontology;
use twincheck_contract::types::SiteDetails;
use twincheck_contract::types::TwinModel;

use crate::client::ApiResponse;
use crate::client::Credential;
use crate::client::ServiceClient;
use crate::error::ValidationError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest accepted difference between requested and echoed coordinates.
const COORDINATE_TOLERANCE: f64 = 1e-9;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of a pagination round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationOutcome {
    /// Page size requested on both pages.
    pub limit: u32,
    /// Entities returned on the first page.
    pub first_page_entities: usize,
    /// Cursor returned by the first page, if any.
    pub next_cursor: Option<Cursor>,
    /// Entities returned on the replayed page, when a cursor was present.
    pub second_page_entities: Option<usize>,
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Contract checks bound to a session's service clients.
#[derive(Debug)]
pub struct ContractValidator<'a> {
    /// Datacenter twin API client.
    datacenter: &'a ServiceClient,
    /// Forecast API client.
    forecast: &'a ServiceClient,
    /// Site used when an endpoint needs a site id for an auth check.
    auth_site: &'a str,
    /// Coordinates used when the forecast endpoint is checked for auth.
    auth_forecast: ForecastQuery,
    /// Compiled response and error envelope schemas.
    schemas: &'a ContractSchemas,
}

impl<'a> ContractValidator<'a> {
    /// Creates a validator over existing service clients and compiled schemas.
    #[must_use]
    pub fn new(
        datacenter: &'a ServiceClient,
        forecast: &'a ServiceClient,
        auth_site: &'a str,
        auth_forecast: ForecastQuery,
        schemas: &'a ContractSchemas,
    ) -> Self {
        Self {
            datacenter,
            forecast,
            auth_site,
            auth_forecast,
            schemas,
        }
    }

    /// `GET /model`: expect 200 with the twin model schema.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] on status, schema, or decode failure.
    pub fn twin_model(&self) -> Result<TwinModel, ValidationError> {
        let response =
            self.datacenter.get(Endpoint::TwinModel, None, &[], &Credential::Configured)?;
        self.check_contract(&response)?;
        decode(&response)
    }

    /// `GET /details/{siteId}`: expect 200, the details schema (including the
    /// entity attribute rules), a `siteId` echo, and the filter and limit contracts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] on the first failed assertion.
    pub fn site_details(
        &self,
        site_id: &str,
        query: &DetailsQuery,
    ) -> Result<SiteDetails, ValidationError> {
        let response = self.details_response(site_id, query, &Credential::Configured)?;
        self.check_contract(&response)?;
        let body = &response.body;
        let echoed = body.get("siteId").and_then(Value::as_str).unwrap_or_default();
        if echoed != site_id {
            return Err(mismatch(&response, "$.siteId", site_id, echoed));
        }
        let entities = body.get("entities").and_then(Value::as_array).map_or(&[][..], Vec::as_slice);
        if let Some(expected) = &query.entity_type {
            for (index, entity) in entities.iter().enumerate() {
                let actual = entity.get("type").and_then(Value::as_str).unwrap_or_default();
                if actual != expected {
                    return Err(mismatch(
                        &response,
                        &format!("$.entities[{index}].type"),
                        expected,
                        actual,
                    ));
                }
            }
        }
        if let Some(limit) = query.limit
            && usize::try_from(limit).is_ok_and(|limit| entities.len() > limit)
        {
            return Err(mismatch(
                &response,
                "$.entities",
                &format!("at most {limit} entities"),
                &format!("{} entities", entities.len()),
            ));
        }
        decode(&response)
    }

    /// `GET /ontology`: expect 200 with a `@context` map of string URIs.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] on status, schema, or decode failure.
    pub fn ontology(&self) -> Result<Ontology, ValidationError> {
        let response =
            self.datacenter.get(Endpoint::Ontology, None, &[], &Credential::Configured)?;
        self.check_contract(&response)?;
        decode(&response)
    }

    /// `GET /v1/forecast`: expect 200, the forecast schema, a coordinate echo,
    /// and the required metrics on the metric list and every point.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] on the first failed assertion.
    pub fn forecast(&self, query: &ForecastQuery) -> Result<ForecastResponse, ValidationError> {
        let response = self.forecast.get(
            Endpoint::Forecast,
            None,
            &query.query_pairs(),
            &Credential::Configured,
        )?;
        self.check_contract(&response)?;
        expect_coordinate(&response, "longitude", query.longitude)?;
        expect_coordinate(&response, "latitude", query.latitude)?;
        let names: BTreeSet<&str> = response
            .body
            .pointer("/data/metrics")
            .and_then(Value::as_array)
            .map(|metrics| {
                metrics.iter().filter_map(|metric| metric.get("name")?.as_str()).collect()
            })
            .unwrap_or_default();
        for required in FORECAST_REQUIRED_METRICS {
            if !names.contains(required) {
                return Err(mismatch(
                    &response,
                    "$.data.metrics",
                    &format!("metric {required}"),
                    "absent",
                ));
            }
        }
        decode(&response)
    }

    /// Requests `endpoint` with a missing or invalid credential and expects
    /// 401 with an error envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the request is not rejected with 401
    /// or the rejection lacks the envelope.
    pub fn expect_unauthorized(
        &self,
        endpoint: Endpoint,
        credential: &Credential,
    ) -> Result<ErrorEnvelope, ValidationError> {
        let client = match endpoint.service() {
            Service::Datacenter => self.datacenter,
            Service::Forecast => self.forecast,
        };
        let site_id = endpoint.takes_site_id().then_some(self.auth_site);
        let query = match endpoint {
            Endpoint::Forecast => self.auth_forecast.query_pairs(),
            Endpoint::TwinModel | Endpoint::SiteDetails | Endpoint::Ontology => Vec::new(),
        };
        let response = client.get(endpoint, site_id, &query, credential)?;
        expect_status(&response, &[401])?;
        self.error_envelope(&response)
    }

    /// Requests details for an unknown or malformed site id and expects 404
    /// (400 is also accepted for blank ids) with an error envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the site is not rejected as expected.
    pub fn expect_site_rejected(&self, site_id: &str) -> Result<ErrorEnvelope, ValidationError> {
        let response =
            self.details_response(site_id, &DetailsQuery::new(), &Credential::Configured)?;
        let accepted: &[u16] = if site_id.trim().is_empty() { &[404, 400] } else { &[404] };
        expect_status(&response, accepted)?;
        self.error_envelope(&response)
    }

    /// Replays a malformed cursor and expects 400 with an error envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the cursor is not rejected with 400.
    pub fn expect_cursor_rejected(
        &self,
        site_id: &str,
        cursor: &Cursor,
    ) -> Result<ErrorEnvelope, ValidationError> {
        let query = DetailsQuery::new().with_cursor(cursor.clone());
        let response = self.details_response(site_id, &query, &Credential::Configured)?;
        expect_status(&response, &[400])?;
        self.error_envelope(&response)
    }

    /// Validates the error envelope of an error response.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Status`] for non-error statuses and
    /// [`ValidationError::Envelope`] when the envelope is missing or malformed.
    pub fn error_envelope(
        &self,
        response: &ApiResponse,
    ) -> Result<ErrorEnvelope, ValidationError> {
        if !response.is_error() {
            return Err(ValidationError::Status {
                endpoint: label(response),
                expected: ">= 400".to_string(),
                actual: response.status,
            });
        }
        let envelope_error = |violation: ShapeViolation| ValidationError::Envelope {
            endpoint: label(response),
            status: response.status,
            violation,
        };
        if response.body_error.is_some() {
            return Err(envelope_error(ShapeViolation::new(
                "$",
                ViolationKind::WrongType {
                    expected: "object",
                    actual: "non-json body",
                },
            )));
        }
        self.schemas.error_envelope().validate(&response.body).map_err(envelope_error)?;
        decode(response)
    }

    /// Fetches a first page with `limit`; when it carries `page.nextCursor`,
    /// replays the cursor with the same limit and requires an `entities` array.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when either page fails its checks.
    pub fn pagination_round_trip(
        &self,
        site_id: &str,
        limit: u32,
    ) -> Result<PaginationOutcome, ValidationError> {
        let first = self.site_details(site_id, &DetailsQuery::new().with_limit(limit))?;
        let mut outcome = PaginationOutcome {
            limit,
            first_page_entities: first.entities.len(),
            next_cursor: first.page.next_cursor,
            second_page_entities: None,
        };
        let Some(cursor) = outcome.next_cursor.clone() else {
            debug!(site_id, limit, "single page; no cursor to replay");
            return Ok(outcome);
        };
        let query = DetailsQuery::new().with_limit(limit).with_cursor(cursor);
        let response = self.details_response(site_id, &query, &Credential::Configured)?;
        expect_status(&response, &[200])?;
        let body = response.json()?;
        let entities = match body.get("entities") {
            Some(Value::Array(items)) => items.len(),
            Some(other) => {
                return Err(shape_error(
                    &response,
                    ShapeViolation::new(
                        "$.entities",
                        ViolationKind::WrongType {
                            expected: "array",
                            actual: json_type_label(other),
                        },
                    ),
                ));
            }
            None => {
                return Err(shape_error(
                    &response,
                    ShapeViolation::new(
                        "$",
                        ViolationKind::MissingField {
                            field: "entities".to_string(),
                        },
                    ),
                ));
            }
        };
        outcome.second_page_entities = Some(entities);
        Ok(outcome)
    }

    /// Issues the same details request twice and requires matching statuses
    /// and top-level key sets. Returns the shared key set.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Mismatch`] when the responses differ.
    pub fn idempotent_shape(
        &self,
        site_id: &str,
        query: &DetailsQuery,
    ) -> Result<BTreeSet<String>, ValidationError> {
        let first = self.details_response(site_id, query, &Credential::Configured)?;
        let second = self.details_response(site_id, query, &Credential::Configured)?;
        if first.status != second.status {
            return Err(mismatch(
                &second,
                "$",
                &format!("status {}", first.status),
                &format!("status {}", second.status),
            ));
        }
        let keys = first.top_level_keys();
        let repeat = second.top_level_keys();
        if keys != repeat {
            return Err(mismatch(&second, "$", &join_keys(&keys), &join_keys(&repeat)));
        }
        Ok(keys)
    }

    /// Checks status and response schema against the endpoint contract.
    fn check_contract(&self, response: &ApiResponse) -> Result<(), ValidationError> {
        let contract = contract_for(response.endpoint);
        expect_status(response, &[contract.success_status])?;
        let body = response.json()?;
        self.schemas
            .response(response.endpoint)
            .validate(body)
            .map_err(|violation| shape_error(response, violation))
    }

    /// Issues a raw details request without checking the response.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] only for request or transport failures.
    pub fn details_response(
        &self,
        site_id: &str,
        query: &DetailsQuery,
        credential: &Credential,
    ) -> Result<ApiResponse, ValidationError> {
        self.datacenter.get(Endpoint::SiteDetails, Some(site_id), &query.query_pairs(), credential)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the endpoint label of a response.
fn label(response: &ApiResponse) -> String {
    response.endpoint.as_str().to_string()
}

/// Requires the response status to be one of `accepted`.
fn expect_status(response: &ApiResponse, accepted: &[u16]) -> Result<(), ValidationError> {
    if accepted.contains(&response.status) {
        return Ok(());
    }
    let expected =
        accepted.iter().map(u16::to_string).collect::<Vec<_>>().join(" or ");
    Err(ValidationError::Status {
        endpoint: label(response),
        expected,
        actual: response.status,
    })
}

/// Decodes the JSON body into a typed record.
fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, ValidationError> {
    let body = response.json()?;
    T::deserialize(body).map_err(|err| ValidationError::Decode {
        endpoint: label(response),
        message: err.to_string(),
    })
}

/// Wraps a schema violation with the endpoint label.
fn shape_error(response: &ApiResponse, violation: ShapeViolation) -> ValidationError {
    ValidationError::Shape {
        endpoint: label(response),
        violation,
    }
}

/// Builds a value mismatch error.
fn mismatch(response: &ApiResponse, path: &str, expected: &str, actual: &str) -> ValidationError {
    ValidationError::Mismatch {
        endpoint: label(response),
        path: path.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

/// Requires `data.resource.<axis>` to echo the requested coordinate.
fn expect_coordinate(
    response: &ApiResponse,
    axis: &str,
    requested: f64,
) -> Result<(), ValidationError> {
    let echoed = response.body.pointer(&format!("/data/resource/{axis}")).and_then(Value::as_f64);
    match echoed {
        Some(value) if (value - requested).abs() <= COORDINATE_TOLERANCE => Ok(()),
        other => Err(mismatch(
            response,
            &format!("$.data.resource.{axis}"),
            &requested.to_string(),
            &other.map_or_else(|| "absent".to_string(), |value| value.to_string()),
        )),
    }
}

/// Renders a key set for mismatch messages.
fn join_keys(keys: &BTreeSet<String>) -> String {
    let joined = keys.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
    format!("keys [{joined}]")
}
