// crates/twincheck-validator/src/client.rs
// ============================================================================
// Module: Service Client
// Description: Blocking HTTP client bound to one upstream service.
// Purpose: Issue GET requests with bounded bodies and record a transcript.
// Dependencies: reqwest, serde, serde_json, tracing, twincheck-config
// ============================================================================

//! ## Overview
//! [`ServiceClient`] owns one `reqwest` blocking client per service so that
//! connections are reused for the lifetime of a session. Every request is
//! recorded in a shared [`Transcript`]; the bearer token itself is never
//! logged or recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io::Read;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use twincheck_config::HttpConfig;
use twincheck_contract::Endpoint;
use twincheck_contract::Service;

use crate::error::ValidationError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// User agent sent with every request.
const USER_AGENT: &str = concat!("twincheck/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Authorization sent with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// The bearer token configured for the service.
    Configured,
    /// No `Authorization` header at all.
    Absent,
    /// An explicit bearer token (used for invalid-token checks).
    Bearer(String),
}

impl Credential {
    /// Returns a label safe to log and record.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Configured => "configured",
            Self::Absent => "absent",
            Self::Bearer(_) => "override",
        }
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Endpoint that was called.
    pub endpoint: Endpoint,
    /// Request path and query, without scheme or host.
    pub target: String,
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body (`Null` when the body is not JSON).
    pub body: Value,
    /// Parse failure for non-JSON bodies.
    pub body_error: Option<String>,
}

impl ApiResponse {
    /// Returns true for statuses >= 400.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Returns the JSON body, or a decode error when the body was not JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Decode`] when the body failed to parse.
    pub fn json(&self) -> Result<&Value, ValidationError> {
        match &self.body_error {
            Some(message) => Err(ValidationError::Decode {
                endpoint: self.endpoint.as_str().to_string(),
                message: message.clone(),
            }),
            None => Ok(&self.body),
        }
    }

    /// Returns the top-level keys of an object body (empty otherwise).
    #[must_use]
    pub fn top_level_keys(&self) -> BTreeSet<String> {
        self.body.as_object().map(|map| map.keys().cloned().collect()).unwrap_or_default()
    }
}

// ============================================================================
// SECTION: Transcript
// ============================================================================

/// One recorded request/response exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    /// Monotonic sequence within the session.
    pub sequence: u64,
    /// Upstream service.
    pub service: Service,
    /// Endpoint that was called.
    pub endpoint: Endpoint,
    /// HTTP method.
    pub method: &'static str,
    /// Request path.
    pub path: String,
    /// Query parameters.
    pub query: BTreeMap<String, String>,
    /// Credential label (never the token).
    pub credential: &'static str,
    /// Status code, when a response arrived.
    pub status: Option<u16>,
    /// Round-trip time in milliseconds.
    pub elapsed_ms: u64,
    /// Parsed response body.
    pub body: Value,
    /// Transport or decode failure detail.
    pub error: Option<String>,
}

/// Shared, append-only request transcript.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    /// Recorded entries in request order.
    entries: Arc<Mutex<Vec<TranscriptEntry>>>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.entries.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Returns the number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Returns true when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends an entry, assigning the next sequence number.
    fn record(&self, mut entry: TranscriptEntry) {
        let Ok(mut guard) = self.entries.lock() else {
            return;
        };
        entry.sequence = u64::try_from(guard.len()).unwrap_or(u64::MAX).saturating_add(1);
        guard.push(entry);
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking client bound to one service base URL and token.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    /// Upstream service.
    service: Service,
    /// Parsed base URL.
    base_url: Url,
    /// Configured bearer token.
    token: String,
    /// Underlying connection pool.
    client: Client,
    /// Maximum response body size.
    max_response_bytes: usize,
    /// Shared transcript sink.
    transcript: Transcript,
}

impl ServiceClient {
    /// Builds a client for one service.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Client`] when the base URL is invalid or the
    /// HTTP client cannot be created.
    pub fn new(
        service: Service,
        base_url: &str,
        token: &str,
        http: &HttpConfig,
        transcript: Transcript,
    ) -> Result<Self, ValidationError> {
        let base_url = Url::parse(base_url.trim()).map_err(|err| {
            ValidationError::Client(format!("{} base url invalid: {err}", service.as_str()))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ValidationError::Client(format!(
                "{} base url cannot carry a path",
                service.as_str()
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(http.timeout_ms))
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(http.accept_invalid_certs)
            .build()
            .map_err(|err| ValidationError::Client(format!("http client build failed: {err}")))?;
        Ok(Self {
            service,
            base_url,
            token: token.to_string(),
            client,
            max_response_bytes: http.max_response_bytes,
            transcript,
        })
    }

    /// Returns the service this client talks to.
    #[must_use]
    pub const fn service(&self) -> Service {
        self.service
    }

    /// Issues a GET request against an endpoint.
    ///
    /// Any status code is returned as a response; only transport failures and
    /// oversized bodies are errors.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Request`] when the URL cannot be built and
    /// [`ValidationError::Transport`] when the exchange fails.
    pub fn get(
        &self,
        endpoint: Endpoint,
        site_id: Option<&str>,
        query: &[(&'static str, String)],
        credential: &Credential,
    ) -> Result<ApiResponse, ValidationError> {
        let url = self.url_for(endpoint, site_id, query)?;
        let target = request_target(&url);
        let path = url.path().to_string();
        let token = match credential {
            Credential::Configured => Some(self.token.as_str()),
            Credential::Absent => None,
            Credential::Bearer(token) => Some(token.as_str()),
        };
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        debug!(
            service = self.service.as_str(),
            endpoint = endpoint.as_str(),
            target = %target,
            credential = credential.label(),
            "request start"
        );
        let started = Instant::now();
        let outcome = request
            .send()
            .map_err(|err| err.to_string())
            .and_then(|mut response| {
                let status = response.status().as_u16();
                read_response_limited(&mut response, self.max_response_bytes)
                    .map(|bytes| (status, bytes))
            });
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let mut entry = TranscriptEntry {
            sequence: 0,
            service: self.service,
            endpoint,
            method: "GET",
            path,
            query: query.iter().map(|(key, value)| ((*key).to_string(), value.clone())).collect(),
            credential: credential.label(),
            status: None,
            elapsed_ms,
            body: Value::Null,
            error: None,
        };
        match outcome {
            Err(message) => {
                debug!(
                    endpoint = endpoint.as_str(),
                    target = %target,
                    elapsed_ms,
                    error = %message,
                    "request failed"
                );
                entry.error = Some(message.clone());
                self.transcript.record(entry);
                Err(ValidationError::Transport {
                    endpoint: endpoint.as_str().to_string(),
                    message,
                })
            }
            Ok((status, bytes)) => {
                debug!(
                    endpoint = endpoint.as_str(),
                    target = %target,
                    status,
                    elapsed_ms,
                    bytes = bytes.len(),
                    "request finish"
                );
                let (body, body_error) = parse_body(&bytes);
                entry.status = Some(status);
                entry.body = body.clone();
                entry.error.clone_from(&body_error);
                self.transcript.record(entry);
                Ok(ApiResponse {
                    endpoint,
                    target,
                    status,
                    body,
                    body_error,
                })
            }
        }
    }

    /// Builds the request URL from the base URL, endpoint segments, and query.
    fn url_for(
        &self,
        endpoint: Endpoint,
        site_id: Option<&str>,
        query: &[(&'static str, String)],
    ) -> Result<Url, ValidationError> {
        let request_error = |message: &str| ValidationError::Request {
            endpoint: endpoint.as_str().to_string(),
            message: message.to_string(),
        };
        if endpoint.service() != self.service {
            return Err(request_error("endpoint belongs to a different service"));
        }
        let site_id = match (endpoint.takes_site_id(), site_id) {
            (true, Some(site_id)) => Some(site_id),
            (true, None) => return Err(request_error("site id required")),
            (false, Some(_)) => return Err(request_error("endpoint takes no site id")),
            (false, None) => None,
        };
        let mut url = self.base_url.clone();
        {
            let mut segments =
                url.path_segments_mut().map_err(|()| request_error("base url has no path"))?;
            segments.pop_if_empty().extend(endpoint.segments());
            if let Some(site_id) = site_id {
                segments.push(site_id);
            }
        }
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Renders the path and query of a URL.
fn request_target(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}

/// Parses a response body as JSON, keeping the failure detail.
fn parse_body(bytes: &[u8]) -> (Value, Option<String>) {
    if bytes.is_empty() {
        return (Value::Null, Some("empty response body".to_string()));
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => (value, None),
        Err(err) => (Value::Null, Some(format!("invalid json: {err}"))),
    }
}

/// Reads a response body while enforcing a hard size limit.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, String> {
    let expected_len = response.content_length();
    let max_bytes_u64 =
        u64::try_from(max_bytes).map_err(|_| "response size limit exceeds u64".to_string())?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err("http response exceeds size limit".to_string());
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle.read_to_end(&mut buf).map_err(|err| format!("failed to read response: {err}"))?;
    if buf.len() > max_bytes {
        return Err("http response exceeds size limit".to_string());
    }
    if let Some(expected) = expected_len {
        let expected =
            usize::try_from(expected).map_err(|_| "invalid response length".to_string())?;
        if buf.len() < expected {
            return Err("http response truncated".to_string());
        }
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
