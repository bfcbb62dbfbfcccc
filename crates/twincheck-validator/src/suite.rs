// crates/twincheck-validator/src/suite.rs
// ============================================================================
// Module: Contract Suite
// Description: Enumerates and runs every contract case for a configuration.
// Purpose: Drive the validator sequentially and collect per-case outcomes.
// Dependencies: serde, tracing, twincheck-config, twincheck-contract
// ============================================================================

//! ## Overview
//! [`ContractSuite::from_config`] expands the configuration catalogue into a
//! list of [`SuiteCase`]s (one per valid site, invalid site, entity type, auth
//! mode, and so on). [`ContractSuite::run`] executes them in order against a
//! single session. A failing case is recorded and the run continues.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use serde::Serialize;
use tracing::info;
use tracing::warn;
use twincheck_config::ValidatorConfig;
use twincheck_contract::Cursor;
use twincheck_contract::DetailsQuery;
use twincheck_contract::Endpoint;
use twincheck_contract::ForecastQuery;
use twincheck_contract::Service;

use crate::client::Credential;
use crate::error::ValidationError;
use crate::report::CaseOutcome;
use crate::report::CaseStatus;
use crate::report::SuiteReport;
use crate::session::ValidatorSession;
use crate::validator::ContractValidator;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Cursor value the details endpoint must reject.
pub const MALFORMED_CURSOR: &str = "INVALID_CURSOR_VALUE";

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Services included in a suite run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceSelection {
    /// Datacenter twin API only.
    Datacenter,
    /// Forecast API only.
    Forecast,
    /// Both services.
    All,
}

impl ServiceSelection {
    /// Returns true when `service` is part of the selection.
    #[must_use]
    pub const fn includes(self, service: Service) -> bool {
        matches!(
            (self, service),
            (Self::All, _)
                | (Self::Datacenter, Service::Datacenter)
                | (Self::Forecast, Service::Forecast)
        )
    }

    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Datacenter => "datacenter",
            Self::Forecast => "forecast",
            Self::All => "all",
        }
    }
}

// ============================================================================
// SECTION: Cases
// ============================================================================

/// How an auth case presents credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// No `Authorization` header.
    MissingToken,
    /// The configured invalid bearer token.
    InvalidToken,
}

impl AuthMode {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::InvalidToken => "invalid_token",
        }
    }
}

/// One contract check with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum SuiteCase {
    /// Twin model schema.
    TwinModel,
    /// Details schema and `siteId` echo for a valid site.
    SiteDetails {
        /// Site under test.
        site_id: String,
    },
    /// Unknown or malformed site is rejected.
    SiteRejected {
        /// Site under test.
        site_id: String,
    },
    /// `entityType` filter returns only matching entities.
    EntityTypeFilter {
        /// Site under test.
        site_id: String,
        /// Requested entity type.
        entity_type: String,
        /// Requested page size.
        limit: u32,
    },
    /// `limit` bounds the entity count.
    LimitBound {
        /// Site under test.
        site_id: String,
        /// Requested page size.
        limit: u32,
    },
    /// Cursor replay returns an `entities` array.
    Pagination {
        /// Site under test.
        site_id: String,
        /// Requested page size.
        limit: u32,
    },
    /// Repeated requests keep the same top-level shape.
    Idempotence {
        /// Site under test.
        site_id: String,
    },
    /// Malformed cursor is rejected with 400.
    MalformedCursor {
        /// Site under test.
        site_id: String,
        /// Cursor replayed verbatim.
        cursor: Cursor,
    },
    /// Ontology context schema.
    Ontology,
    /// Endpoint rejects a missing or invalid credential.
    Unauthorized {
        /// Endpoint under test.
        endpoint: Endpoint,
        /// Credential presented.
        mode: AuthMode,
    },
    /// `SiteType` entity attributes.
    SiteEntityStructure {
        /// Site under test.
        site_id: String,
    },
    /// `PowerDeviceType` entity attributes and state.
    PowerDeviceStructure {
        /// Site under test.
        site_id: String,
    },
    /// `feeds` relationship endpoints.
    FeedsRelationships {
        /// Site under test.
        site_id: String,
    },
    /// Error responses carry the error envelope.
    ErrorEnvelope {
        /// Site expected to produce an error response.
        site_id: String,
    },
    /// Forecast schema, coordinate echo, and required metrics.
    Forecast {
        /// Requested longitude.
        longitude: f64,
        /// Requested latitude.
        latitude: f64,
    },
}

impl SuiteCase {
    /// Returns a unique, human-readable case name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::TwinModel => "twin_model".to_string(),
            Self::SiteDetails {
                site_id,
            } => format!("site_details[{site_id}]"),
            Self::SiteRejected {
                site_id,
            } => format!("site_rejected[\"{site_id}\"]"),
            Self::EntityTypeFilter {
                site_id,
                entity_type,
                limit,
            } => format!("entity_type_filter[{site_id},{entity_type},limit={limit}]"),
            Self::LimitBound {
                site_id,
                limit,
            } => format!("limit_bound[{site_id},limit={limit}]"),
            Self::Pagination {
                site_id,
                limit,
            } => format!("pagination[{site_id},limit={limit}]"),
            Self::Idempotence {
                site_id,
            } => format!("idempotence[{site_id}]"),
            Self::MalformedCursor {
                site_id, ..
            } => format!("malformed_cursor[{site_id}]"),
            Self::Ontology => "ontology".to_string(),
            Self::Unauthorized {
                endpoint,
                mode,
            } => format!("unauthorized[{},{}]", endpoint.as_str(), mode.as_str()),
            Self::SiteEntityStructure {
                site_id,
            } => format!("site_entity_structure[{site_id}]"),
            Self::PowerDeviceStructure {
                site_id,
            } => format!("power_device_structure[{site_id}]"),
            Self::FeedsRelationships {
                site_id,
            } => format!("feeds_relationships[{site_id}]"),
            Self::ErrorEnvelope {
                site_id,
            } => format!("error_envelope[{site_id}]"),
            Self::Forecast {
                longitude,
                latitude,
            } => format!("forecast[{longitude},{latitude}]"),
        }
    }
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Ordered list of contract cases for one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractSuite {
    /// Services covered.
    selection: ServiceSelection,
    /// Cases in execution order.
    cases: Vec<SuiteCase>,
}

impl ContractSuite {
    /// Expands the configuration catalogue into suite cases.
    #[must_use]
    pub fn from_config(config: &ValidatorConfig, selection: ServiceSelection) -> Self {
        let mut cases = Vec::new();
        if selection.includes(Service::Datacenter) {
            datacenter_cases(config, &mut cases);
        }
        if selection.includes(Service::Forecast) {
            cases.push(SuiteCase::Forecast {
                longitude: config.forecast.longitude,
                latitude: config.forecast.latitude,
            });
        }
        Self {
            selection,
            cases,
        }
    }

    /// Returns the cases in execution order.
    #[must_use]
    pub fn cases(&self) -> &[SuiteCase] {
        &self.cases
    }

    /// Returns the service selection.
    #[must_use]
    pub const fn selection(&self) -> ServiceSelection {
        self.selection
    }

    /// Runs every case sequentially against one session.
    #[must_use]
    pub fn run(&self, session: &ValidatorSession) -> SuiteReport {
        let validator = session.validator();
        let config = session.config();
        let outcomes: Vec<CaseOutcome> =
            self.cases.iter().map(|case| run_case(&validator, config, case)).collect();
        let report = SuiteReport::new(self.selection, outcomes);
        info!(
            selection = self.selection.as_str(),
            total = report.total,
            passed = report.passed,
            failed = report.failed,
            "contract suite finished"
        );
        report
    }
}

/// Appends the datacenter cases in canonical order.
fn datacenter_cases(config: &ValidatorConfig, cases: &mut Vec<SuiteCase>) {
    let auth_cases = |endpoint: Endpoint, cases: &mut Vec<SuiteCase>| {
        for mode in [AuthMode::MissingToken, AuthMode::InvalidToken] {
            cases.push(SuiteCase::Unauthorized {
                endpoint,
                mode,
            });
        }
    };
    cases.push(SuiteCase::TwinModel);
    auth_cases(Endpoint::TwinModel, cases);

    for site_id in &config.catalog.valid_site_ids {
        cases.push(SuiteCase::SiteDetails {
            site_id: site_id.clone(),
        });
    }
    if let Some(primary) = config.catalog.primary_site() {
        let site_id = primary.to_string();
        for entity_type in &config.catalog.entity_types {
            cases.push(SuiteCase::EntityTypeFilter {
                site_id: site_id.clone(),
                entity_type: entity_type.clone(),
                limit: config.pagination.default_limit,
            });
        }
        cases.push(SuiteCase::LimitBound {
            site_id: site_id.clone(),
            limit: config.pagination.max_limit,
        });
        cases.push(SuiteCase::Pagination {
            site_id: site_id.clone(),
            limit: config.pagination.round_trip_limit,
        });
        cases.push(SuiteCase::Idempotence {
            site_id: site_id.clone(),
        });
        cases.push(SuiteCase::MalformedCursor {
            site_id: site_id.clone(),
            cursor: Cursor::new(MALFORMED_CURSOR),
        });
        auth_cases(Endpoint::SiteDetails, cases);
        cases.push(SuiteCase::SiteEntityStructure {
            site_id: site_id.clone(),
        });
        cases.push(SuiteCase::PowerDeviceStructure {
            site_id: site_id.clone(),
        });
        cases.push(SuiteCase::FeedsRelationships {
            site_id,
        });
    }
    for site_id in &config.catalog.invalid_site_ids {
        cases.push(SuiteCase::SiteRejected {
            site_id: site_id.clone(),
        });
    }
    if let Some(site_id) = config.catalog.invalid_site_ids.iter().find(|id| !id.trim().is_empty())
    {
        cases.push(SuiteCase::ErrorEnvelope {
            site_id: site_id.clone(),
        });
    }

    cases.push(SuiteCase::Ontology);
    auth_cases(Endpoint::Ontology, cases);
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs one case and records its outcome.
fn run_case(
    validator: &ContractValidator<'_>,
    config: &ValidatorConfig,
    case: &SuiteCase,
) -> CaseOutcome {
    let name = case.name();
    let started = Instant::now();
    let result = execute(validator, config, case);
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    match result {
        Ok(message) => CaseOutcome {
            name,
            case: case.clone(),
            status: CaseStatus::Passed,
            message,
            path: None,
            duration_ms,
        },
        Err(err) => {
            warn!(case = %name, error = %err, "contract check failed");
            CaseOutcome {
                name,
                case: case.clone(),
                status: CaseStatus::Failed,
                message: err.to_string(),
                path: err.path().map(str::to_string),
                duration_ms,
            }
        }
    }
}

/// Executes one case, returning a short pass summary.
fn execute(
    validator: &ContractValidator<'_>,
    config: &ValidatorConfig,
    case: &SuiteCase,
) -> Result<String, ValidationError> {
    match case {
        SuiteCase::TwinModel => {
            let model = validator.twin_model()?;
            Ok(format!(
                "{} entity types, {} measurements, {} relationship types",
                model.entity_types.len(),
                model.measurements.len(),
                model.relationships.len()
            ))
        }
        SuiteCase::SiteDetails {
            site_id,
        } => {
            let details = validator.site_details(site_id, &DetailsQuery::new())?;
            Ok(format!(
                "{} entities, {} relationships",
                details.entities.len(),
                details.relationships.len()
            ))
        }
        SuiteCase::SiteRejected {
            site_id,
        } => {
            let envelope = validator.expect_site_rejected(site_id)?;
            Ok(format!("rejected with code {}", envelope.error.code))
        }
        SuiteCase::EntityTypeFilter {
            site_id,
            entity_type,
            limit,
        } => {
            let query = DetailsQuery::new().with_entity_type(entity_type).with_limit(*limit);
            let details = validator.site_details(site_id, &query)?;
            Ok(format!("{} entities of type {entity_type}", details.entities.len()))
        }
        SuiteCase::LimitBound {
            site_id,
            limit,
        } => {
            let details = validator.site_details(site_id, &DetailsQuery::new().with_limit(*limit))?;
            Ok(format!("{} entities within limit {limit}", details.entities.len()))
        }
        SuiteCase::Pagination {
            site_id,
            limit,
        } => {
            let outcome = validator.pagination_round_trip(site_id, *limit)?;
            Ok(match outcome.second_page_entities {
                Some(count) => format!(
                    "first page {} entities, replayed page {count} entities",
                    outcome.first_page_entities
                ),
                None => format!("single page of {} entities", outcome.first_page_entities),
            })
        }
        SuiteCase::Idempotence {
            site_id,
        } => {
            let keys = validator.idempotent_shape(site_id, &DetailsQuery::new())?;
            Ok(format!("{} stable top-level keys", keys.len()))
        }
        SuiteCase::MalformedCursor {
            site_id,
            cursor,
        } => {
            let envelope = validator.expect_cursor_rejected(site_id, cursor)?;
            Ok(format!("rejected with code {}", envelope.error.code))
        }
        SuiteCase::Ontology => {
            let ontology = validator.ontology()?;
            Ok(format!("{} namespace prefixes", ontology.context.len()))
        }
        SuiteCase::Unauthorized {
            endpoint,
            mode,
        } => {
            let credential = match mode {
                AuthMode::MissingToken => Credential::Absent,
                AuthMode::InvalidToken => {
                    Credential::Bearer(config.datacenter.invalid_token.clone())
                }
            };
            let envelope = validator.expect_unauthorized(*endpoint, &credential)?;
            Ok(format!("rejected with code {}", envelope.error.code))
        }
        SuiteCase::SiteEntityStructure {
            site_id,
        } => {
            let details = validator.site_details(site_id, &DetailsQuery::new())?;
            Ok(format!("{} SiteType entities checked", details.entities_of_type("SiteType").count()))
        }
        SuiteCase::PowerDeviceStructure {
            site_id,
        } => {
            let query = DetailsQuery::new().with_entity_type("PowerDeviceType");
            let details = validator.site_details(site_id, &query)?;
            let rated = details
                .entities
                .iter()
                .filter(|entity| entity.measurement("ratedPower").is_some())
                .count();
            Ok(format!(
                "{} PowerDeviceType entities checked, {rated} with ratedPower",
                details.entities.len()
            ))
        }
        SuiteCase::FeedsRelationships {
            site_id,
        } => {
            let details = validator.site_details(site_id, &DetailsQuery::new())?;
            Ok(format!("{} feeds relationships checked", details.relationships_of_type("feeds").count()))
        }
        SuiteCase::ErrorEnvelope {
            site_id,
        } => {
            let response =
                validator.details_response(site_id, &DetailsQuery::new(), &Credential::Configured)?;
            let envelope = validator.error_envelope(&response)?;
            Ok(format!("status {} with code {}", response.status, envelope.error.code))
        }
        SuiteCase::Forecast {
            longitude,
            latitude,
        } => {
            let forecast = validator.forecast(&ForecastQuery {
                longitude: *longitude,
                latitude: *latitude,
            })?;
            Ok(format!(
                "{} metrics, {} points",
                forecast.data.metrics.len(),
                forecast.data.points.len()
            ))
        }
    }
}
