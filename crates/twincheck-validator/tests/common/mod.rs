// crates/twincheck-validator/tests/common/mod.rs
// ============================================================================
// Module: Stub API Server
// Description: In-process tiny_http stand-in for the twin and forecast APIs.
// Purpose: Exercise the validator offline against healthy and faulty servers.
// Dependencies: tiny_http, serde_json, reqwest
// ============================================================================

//! ## Overview
//! [`StubServer`] serves a small fixed datacenter graph and a forecast on
//! `127.0.0.1:0`. [`Fault`]s switch individual contract breaches on so tests
//! can assert the validator names the offending path.

#![allow(dead_code, reason = "Shared helpers are not used by every test binary.")]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;
use std::thread::JoinHandle;

use reqwest::Url;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;
use twincheck_config::ValidatorConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Token the stub datacenter API accepts.
pub const DATACENTER_TOKEN: &str = "good-token";
/// Token the stub forecast API accepts.
pub const FORECAST_TOKEN: &str = "weather-token";

// ============================================================================
// SECTION: Faults
// ============================================================================

/// Contract breaches the stub can be told to commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Fault {
    /// Details responses echo a different `siteId`.
    WrongSiteEcho,
    /// Details responses omit `page`.
    MissingPage,
    /// `entityType` filter is ignored.
    UnfilteredEntities,
    /// `limit` is ignored.
    IgnoreLimit,
    /// Error responses are `{"detail": ...}` instead of the envelope.
    BareErrors,
    /// Second relationship has an empty `source`.
    EmptyRelationshipSource,
    /// Ontology maps a prefix to a number.
    OntologyNonStringUri,
    /// `ratedPower` is a bare number.
    BareRatedPower,
    /// Any bearer token is accepted.
    AcceptAnyToken,
    /// Malformed cursors are treated as the first page.
    AcceptAnyCursor,
    /// Model measurements lack `measurementType`.
    ModelMissingMeasurementType,
    /// Forecast echoes shifted coordinates.
    ForecastWrongCoordinates,
    /// Forecast metric list omits `relativeHumidity`.
    ForecastMissingMetric,
    /// Forecast reports one value as a string.
    ForecastStringValue,
    /// Replayed pages omit `entities`.
    SecondPageMissingEntities,
    /// Last pages carry `"nextCursor": null` instead of omitting the key.
    NullNextCursor,
    /// Every second details response adds a `generatedAt` top-level key.
    AlternatingKeys,
    /// Every second details response is a 503 error.
    AlternatingStatus,
}

// ============================================================================
// SECTION: Requests & Responses
// ============================================================================

/// A request as seen by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubRequest {
    /// Decoded path.
    pub path: String,
    /// Decoded query parameters.
    pub query: BTreeMap<String, String>,
    /// Raw `Authorization` header.
    pub authorization: Option<String>,
}

/// A canned response.
#[derive(Debug, Clone)]
pub struct StubResponse {
    /// Status code.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

impl StubResponse {
    /// Builds a 200 response.
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body,
        }
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Background stub server; stops when dropped.
pub struct StubServer {
    /// `http://host:port` of the listener.
    base_url: String,
    /// Listener shared with the worker thread.
    server: Arc<Server>,
    /// Requests in arrival order.
    requests: Arc<Mutex<Vec<StubRequest>>>,
    /// Worker thread.
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Starts a healthy stub.
    pub fn healthy() -> Self {
        Self::with_faults(&[])
    }

    /// Starts a stub that commits the given faults.
    pub fn with_faults(faults: &[Fault]) -> Self {
        let faults: BTreeSet<Fault> = faults.iter().copied().collect();
        let details_calls = AtomicUsize::new(0);
        Self::start(move |request| route(&faults, &details_calls, request))
    }

    /// Starts a stub with a custom handler.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&StubRequest) -> StubResponse + Send + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let worker_server = Arc::clone(&server);
        let worker_requests = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            while let Ok(request) = worker_server.recv() {
                let stub_request = parse_request(&request);
                worker_requests.lock().unwrap().push(stub_request.clone());
                let reply = handler(&stub_request);
                let header =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let response = Response::from_string(reply.body.to_string())
                    .with_status_code(reply.status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });
        Self {
            base_url: format!("http://{addr}"),
            server,
            requests,
            handle: Some(handle),
        }
    }

    /// Returns the server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns a configuration pointing both services at this stub.
    pub fn config(&self) -> ValidatorConfig {
        let mut config = ValidatorConfig::default();
        config.datacenter.base_url.clone_from(&self.base_url);
        config.datacenter.auth_token = DATACENTER_TOKEN.to_string();
        config.forecast.base_url.clone_from(&self.base_url);
        config.forecast.auth_token = FORECAST_TOKEN.to_string();
        config.catalog.valid_site_ids = vec!["Site-001".to_string(), "Site-002".to_string()];
        config.catalog.entity_types = ["SiteType", "PowerDeviceType", "PDUType", "Rack"]
            .iter()
            .map(ToString::to_string)
            .collect();
        config.http.timeout_ms = 5_000;
        config
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Extracts path, query, and authorization from a tiny_http request.
fn parse_request(request: &tiny_http::Request) -> StubRequest {
    let url = Url::parse(&format!("http://stub{}", request.url())).unwrap();
    let authorization = request
        .headers()
        .iter()
        .find(|header| header.field.equiv("Authorization"))
        .map(|header| header.value.as_str().to_string());
    StubRequest {
        path: url.path().to_string(),
        query: url.query_pairs().into_owned().collect(),
        authorization,
    }
}

// ============================================================================
// SECTION: Routing
// ============================================================================

/// Dispatches a request to the matching fixture.
fn route(
    faults: &BTreeSet<Fault>,
    details_calls: &AtomicUsize,
    request: &StubRequest,
) -> StubResponse {
    if request.path == "/v1/forecast" {
        if !authorized(faults, request, FORECAST_TOKEN) {
            return error(faults, 401, "UNAUTHORIZED", "missing or invalid token");
        }
        return forecast(faults, request);
    }
    let Some(rest) = request.path.strip_prefix("/twin/datacenter/v1/") else {
        return error(faults, 404, "NOT_FOUND", "no such route");
    };
    if !authorized(faults, request, DATACENTER_TOKEN) {
        return error(faults, 401, "UNAUTHORIZED", "missing or invalid token");
    }
    match rest {
        "model" => model(faults),
        "ontology" => ontology(faults),
        "details" | "details/" => error(faults, 400, "BAD_REQUEST", "site id required"),
        _ => match rest.strip_prefix("details/") {
            Some(site_id) => {
                let call = details_calls.fetch_add(1, Ordering::SeqCst);
                details(faults, site_id, &request.query, call % 2 == 1)
            }
            None => error(faults, 404, "NOT_FOUND", "no such route"),
        },
    }
}

/// Checks the bearer token for a service.
fn authorized(faults: &BTreeSet<Fault>, request: &StubRequest, token: &str) -> bool {
    match &request.authorization {
        None => false,
        Some(_) if faults.contains(&Fault::AcceptAnyToken) => true,
        Some(value) => value == &format!("Bearer {token}"),
    }
}

/// Builds an error response, enveloped unless `BareErrors` is set.
fn error(faults: &BTreeSet<Fault>, status: u16, code: &str, message: &str) -> StubResponse {
    let body = if faults.contains(&Fault::BareErrors) {
        json!({"detail": message})
    } else {
        json!({"error": {"code": code, "message": message}})
    };
    StubResponse {
        status,
        body,
    }
}

// ============================================================================
// SECTION: Datacenter Fixtures
// ============================================================================

/// `GET /model` fixture.
fn model(faults: &BTreeSet<Fault>) -> StubResponse {
    let measurement = if faults.contains(&Fault::ModelMissingMeasurementType) {
        json!({"value": 0})
    } else {
        json!({"value": 0, "measurementType": "ActivePower"})
    };
    StubResponse::ok(json!({
        "entityTypes": [
            {"id": "dc:SiteType", "entityType": "SiteType"},
            {"id": "dc:PDUType", "entityType": "PDUType"}
        ],
        "measurements": [measurement],
        "relationships": [{"relationshipType": "feeds"}, {"relationshipType": "containsEquipment"}]
    }))
}

/// `GET /ontology` fixture.
fn ontology(faults: &BTreeSet<Fault>) -> StubResponse {
    let dc = if faults.contains(&Fault::OntologyNonStringUri) {
        json!(42)
    } else {
        json!("https://example.test/ontology/datacenter#")
    };
    StubResponse::ok(json!({
        "@context": {"dc": dc, "rdfs": "http://www.w3.org/2000/01/rdf-schema#"}
    }))
}

/// Entities per known site.
fn site_entities(faults: &BTreeSet<Fault>, site_id: &str) -> Option<Vec<Value>> {
    let rated_power = if faults.contains(&Fault::BareRatedPower) {
        json!(1500)
    } else {
        json!({"value": 1500, "measurementType": "ActivePower"})
    };
    match site_id {
        "Site-001" => Some(vec![
            json!({"id": "site-1", "type": "SiteType", "attributes": {"siteId": "Site-001"}}),
            json!({"id": "pd-1", "type": "PowerDeviceType",
                   "attributes": {"ratedPower": rated_power}, "state": {"online": true}}),
            json!({"id": "pd-2", "type": "PowerDeviceType", "attributes": {}}),
            json!({"id": "pdu-1", "type": "PDUType", "attributes": {"name": "PDU A"}}),
            json!({"id": "pdu-2", "type": "PDUType", "attributes": {"name": "PDU B"}}),
            json!({"id": "pdu-3", "type": "PDUType", "attributes": {"name": "PDU C"}}),
            json!({"id": "rack-1", "type": "Rack", "attributes": {}}),
        ]),
        "Site-002" => Some(vec![
            json!({"id": "site-2", "type": "SiteType", "attributes": {"siteId": "Site-002"}}),
            json!({"id": "rack-9", "type": "Rack", "attributes": {}}),
        ]),
        _ => None,
    }
}

/// Relationships per known site.
fn site_relationships(faults: &BTreeSet<Fault>, site_id: &str) -> Vec<Value> {
    if site_id != "Site-001" {
        return Vec::new();
    }
    let second_source = if faults.contains(&Fault::EmptyRelationshipSource) { "" } else { "pdu-2" };
    vec![
        json!({"id": "rel-1", "source": "pdu-1", "target": "rack-1", "type": "feeds"}),
        json!({"id": "rel-2", "source": second_source, "target": "rack-1", "type": "feeds"}),
        json!({"id": "rel-3", "source": "site-1", "target": "pdu-1", "type": "containsEquipment"}),
    ]
}

/// Encodes a page offset as an opaque cursor.
fn encode_cursor(offset: usize) -> String {
    format!("cur-{offset:04x}")
}

/// Decodes a cursor produced by [`encode_cursor`].
fn decode_cursor(cursor: &str) -> Option<usize> {
    usize::from_str_radix(cursor.strip_prefix("cur-")?, 16).ok()
}

/// `GET /details/{siteId}` fixture with filtering and pagination.
///
/// `odd_call` marks every second details request, used by the alternating faults.
fn details(
    faults: &BTreeSet<Fault>,
    site_id: &str,
    query: &BTreeMap<String, String>,
    odd_call: bool,
) -> StubResponse {
    if odd_call && faults.contains(&Fault::AlternatingStatus) {
        return error(faults, 503, "UNAVAILABLE", "try again later");
    }
    let Some(mut entities) = site_entities(faults, site_id) else {
        return error(faults, 404, "NOT_FOUND", "unknown site");
    };
    if let Some(entity_type) = query.get("entityType")
        && !faults.contains(&Fault::UnfilteredEntities)
    {
        entities.retain(|entity| entity["type"] == entity_type.as_str());
    }
    let offset = match query.get("cursor") {
        None => 0,
        Some(cursor) => match decode_cursor(cursor) {
            Some(offset) => offset,
            None if faults.contains(&Fault::AcceptAnyCursor) => 0,
            None => return error(faults, 400, "BAD_REQUEST", "malformed cursor"),
        },
    };
    if offset > 0 && faults.contains(&Fault::SecondPageMissingEntities) {
        return StubResponse::ok(json!({"siteId": site_id, "relationships": [], "page": {}}));
    }
    let limit = match query.get("limit") {
        Some(raw) if !faults.contains(&Fault::IgnoreLimit) => match raw.parse::<usize>() {
            Ok(limit) if limit > 0 => limit,
            _ => return error(faults, 400, "BAD_REQUEST", "invalid limit"),
        },
        _ => entities.len().max(1),
    };
    let end = offset.saturating_add(limit).min(entities.len());
    let page_entities: Vec<Value> = entities.get(offset.min(end)..end).unwrap_or(&[]).to_vec();
    let page = if end < entities.len() {
        json!({"nextCursor": encode_cursor(end)})
    } else if faults.contains(&Fault::NullNextCursor) {
        json!({"nextCursor": null})
    } else {
        json!({})
    };
    let echoed = if faults.contains(&Fault::WrongSiteEcho) { "Site-999" } else { site_id };
    let mut body = json!({
        "siteId": echoed,
        "entities": page_entities,
        "relationships": site_relationships(faults, site_id),
    });
    if !faults.contains(&Fault::MissingPage) {
        body["page"] = page;
    }
    if odd_call && faults.contains(&Fault::AlternatingKeys) {
        body["generatedAt"] = json!("2026-01-01T00:00:00Z");
    }
    StubResponse::ok(body)
}

// ============================================================================
// SECTION: Forecast Fixtures
// ============================================================================

/// `GET /v1/forecast` fixture.
fn forecast(faults: &BTreeSet<Fault>, request: &StubRequest) -> StubResponse {
    let parse = |key: &str| request.query.get(key).and_then(|raw| raw.parse::<f64>().ok());
    let (Some(mut longitude), Some(latitude)) = (parse("longitude"), parse("latitude")) else {
        return error(faults, 400, "BAD_REQUEST", "longitude and latitude required");
    };
    if faults.contains(&Fault::ForecastWrongCoordinates) {
        longitude += 1.0;
    }
    let names = ["dryBulbTemperature", "wetBulbTemperature", "relativeHumidity"];
    let listed = if faults.contains(&Fault::ForecastMissingMetric) { &names[..2] } else { &names[..] };
    let metrics: Vec<Value> = listed
        .iter()
        .map(|name| {
            json!({"name": name, "unit": "unit:DEG_C", "quantityKind": "Temperature",
                   "description": format!("{name} forecast")})
        })
        .collect();
    let points: Vec<Value> = (0_i32..3)
        .map(|hour| {
            let mut point = json!({"timestamp": format!("2026-01-01T0{hour}:00:00Z")});
            for (name, offset) in names.iter().zip([0.0, 1.5, 40.0]) {
                point[*name] = json!(10.5 + f64::from(hour) + offset);
            }
            if hour == 2 && faults.contains(&Fault::ForecastStringValue) {
                point["wetBulbTemperature"] = json!("12.5");
            }
            point
        })
        .collect();
    StubResponse::ok(json!({
        "data": {
            "resource": {
                "longitude": longitude,
                "latitude": latitude,
                "timezone": "America/Los_Angeles",
                "elevation": 16
            },
            "metrics": metrics,
            "points": points
        }
    }))
}
