// crates/twincheck-config/src/defaults.rs
// ============================================================================
// Module: Built-in Defaults
// Description: Default targets and test catalogue values.
// Purpose: Provide placeholder values meant for local substitution.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Defaults describe a locally running server with placeholder credentials.
//! Real deployments override them through `twincheck.toml` or `TWINCHECK_*`
//! environment variables.

// ============================================================================
// SECTION: Targets
// ============================================================================

/// Default datacenter API base URL.
pub const DATACENTER_BASE_URL: &str = "https://localhost:8000";
/// Placeholder datacenter bearer token.
pub const DATACENTER_AUTH_TOKEN: &str = "YOUR_JWT_TOKEN_HERE";
/// Token expected to be rejected by every endpoint.
pub const INVALID_AUTH_TOKEN: &str = "INVALID_TOKEN";
/// Default forecast API base URL.
pub const FORECAST_BASE_URL: &str = "http://localhost:8000";
/// Placeholder forecast bearer token.
pub const FORECAST_AUTH_TOKEN: &str = "token";
/// Sample forecast longitude (San Francisco).
pub const FORECAST_LONGITUDE: f64 = -122.4194;
/// Sample forecast latitude (San Francisco).
pub const FORECAST_LATITUDE: f64 = 37.7749;

// ============================================================================
// SECTION: Catalogue
// ============================================================================

/// Site identifiers expected to exist.
pub const VALID_SITE_IDS: &[&str] = &["Site-001", "Site-002", "Site-003"];

/// Site identifiers expected to be rejected (the empty id is a malformed shape).
pub const INVALID_SITE_IDS: &[&str] = &["NON_EXISTENT_SITE", "INVALID_ID", ""];

/// Entity types recognized by the twin model.
pub const ENTITY_TYPES: &[&str] = &[
    "SiteType",
    "ElectricalRoom",
    "DataHall",
    "BatteryRoom",
    "GeneratorYard",
    "GeneratorRoom",
    "Rack",
    "PowerDeviceType",
    "SwitchgearType",
    "FeederType",
    "TransformerType",
    "ATSType",
    "UPSType",
    "BESSType",
    "BMSType",
    "GeneratorSetType",
    "PDUType",
    "RPPType",
    "BuswayType",
    "RackPDUType",
    "STSType",
    "PQMeterType",
    "GatewayType",
    "ControllerType",
    "MCCType",
    "MotorFeederType",
    "SPDType",
    "GroundingNetworkType",
    "UtilityMeterType",
];

/// Relationship types recognized by the twin model.
pub const RELATIONSHIP_TYPES: &[&str] = &[
    "containsEquipment",
    "hasLocation",
    "fedBy",
    "feeds",
    "locatedIn",
    "suppliedBy",
    "suppliesPowerTo",
    "forDevice",
    "hasElectrical",
    "hasTelemetryStream",
    "hasTelemetryPoint",
    "protects",
    "protectedBy",
    "connectedTo",
    "connectedFrom",
    "controls",
    "controlledBy",
    "hasPhase",
    "hasDocument",
];

/// Measurement types recognized by the twin model.
pub const MEASUREMENT_TYPES: &[&str] = &[
    "ActivePower",
    "Voltage",
    "Current",
    "ActiveEnergyExport",
    "ActiveEnergyImport",
    "ApparentPower",
    "DCCurrent",
    "DCVoltage",
    "Frequency",
    "PowerFactor",
    "ReactivePower",
    "RemainingTime",
    "SoC",
    "SoH",
    "THDI",
    "THDV",
    "Temperature",
    "Humidity",
    "VoltageLL",
    "VoltageLN",
];

// ============================================================================
// SECTION: Pagination & HTTP
// ============================================================================

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size the API accepts.
pub const MAX_LIMIT: u32 = 100;
/// Page size used for the pagination round trip.
pub const ROUND_TRIP_LIMIT: u32 = 5;
/// Default request timeout in milliseconds.
pub const TIMEOUT_MS: u64 = 30_000;
/// Default maximum response body size in bytes.
pub const MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

/// Converts a static string list into owned strings.
#[must_use]
pub fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}
