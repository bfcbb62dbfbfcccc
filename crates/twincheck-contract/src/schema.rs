// crates/twincheck-contract/src/schema.rs
// ============================================================================
// Module: Contract Schemas
// Description: Compiled JSON Schema contracts and path-addressed violations.
// Purpose: Validate untrusted response bodies and name the offending JSON path.
// Dependencies: jsonschema, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Every response contract is a draft 2020-12 JSON Schema document compiled
//! once with `jsonschema`. [`ContractSchema::validate`] reduces the validator's
//! error stream to a single [`ShapeViolation`] whose path is `$`-rooted
//! (`$.entities[1].attributes.ratedPower`, `$["@context"].dc`).
//!
//! Security posture: response bodies are untrusted; validation never panics and
//! never follows remote references.
//!
//! ## Invariants
//! - The reported violation is the one closest to the document root; ties keep
//!   the validator's reporting order.
//! - A missing-field violation names the first absent property in the order the
//!   schema lists them under `required`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

use crate::catalog::error_envelope_schema;
use crate::endpoints::Endpoint;
use crate::endpoints::contract_for;

// ============================================================================
// SECTION: Violations
// ============================================================================

/// A single contract violation located by JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {kind}")]
pub struct ShapeViolation {
    /// `$`-rooted JSON path of the offending value.
    pub path: String,
    /// What went wrong at that path.
    pub kind: ViolationKind,
}

impl ShapeViolation {
    /// Creates a violation at `path`.
    #[must_use]
    pub fn new(path: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Failure classes reported by contract validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViolationKind {
    /// A required property is absent from the object at the violation path.
    #[error("missing required field '{field}'")]
    MissingField {
        /// Name of the absent property.
        field: String,
    },
    /// The value has a different JSON type than the contract declares.
    #[error("expected {expected}, found {actual}")]
    WrongType {
        /// Declared type label.
        expected: &'static str,
        /// Observed type label.
        actual: &'static str,
    },
    /// A non-empty array was empty.
    #[error("array must not be empty")]
    EmptyArray,
    /// A non-empty string was empty.
    #[error("string must not be empty")]
    EmptyString,
    /// Any other schema keyword failed.
    #[error("{keyword} constraint failed: {message}")]
    Constraint {
        /// Failing schema keyword.
        keyword: String,
        /// Validator message.
        message: String,
    },
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A contract schema failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {name} schema: {message}")]
pub struct SchemaError {
    /// Schema label.
    pub name: String,
    /// Compiler message.
    pub message: String,
}

// ============================================================================
// SECTION: Compiled Schema
// ============================================================================

/// A JSON Schema document paired with its compiled validator.
pub struct ContractSchema {
    /// Schema label used in compile errors.
    name: String,
    /// Source schema; resolved again when mapping errors to violations.
    schema: Value,
    /// Compiled draft 2020-12 validator.
    validator: Validator,
}

impl fmt::Debug for ContractSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractSchema").field("name", &self.name).finish_non_exhaustive()
    }
}

impl ContractSchema {
    /// Compiles `schema` as a draft 2020-12 JSON Schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the document is not a valid schema.
    pub fn compile(name: impl Into<String>, schema: Value) -> Result<Self, SchemaError> {
        let name = name.into();
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map_err(|err| SchemaError {
                name: name.clone(),
                message: err.to_string(),
            })?;
        Ok(Self {
            name,
            schema,
            validator,
        })
    }

    /// Returns the schema label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the source schema document.
    #[must_use]
    pub const fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validates `instance`, reporting the violation closest to the root.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeViolation`] when the instance does not satisfy the schema.
    pub fn validate(&self, instance: &Value) -> Result<(), ShapeViolation> {
        let first = self
            .validator
            .iter_errors(instance)
            .map(|error| {
                let instance_pointer = error.instance_path().to_string();
                let schema_pointer = error.schema_path().to_string();
                let depth = instance_pointer.matches('/').count();
                let violation = violation_from(
                    &self.schema,
                    instance,
                    &instance_pointer,
                    &schema_pointer,
                    error.to_string(),
                );
                (depth, violation)
            })
            .min_by_key(|(depth, _)| *depth);
        match first {
            Some((_, violation)) => Err(violation),
            None => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Schema Set
// ============================================================================

/// Compiled schemas for every endpoint response and the error envelope.
#[derive(Debug)]
pub struct ContractSchemas {
    /// `GET /model` response schema.
    twin_model: ContractSchema,
    /// `GET /details/{siteId}` response schema.
    site_details: ContractSchema,
    /// `GET /ontology` response schema.
    ontology: ContractSchema,
    /// `GET /v1/forecast` response schema.
    forecast: ContractSchema,
    /// Error envelope schema.
    error_envelope: ContractSchema,
}

impl ContractSchemas {
    /// Compiles the schema of every endpoint contract.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when any contract schema fails to compile.
    pub fn compile() -> Result<Self, SchemaError> {
        let response = |endpoint: Endpoint| {
            ContractSchema::compile(endpoint.as_str(), contract_for(endpoint).response_schema)
        };
        Ok(Self {
            twin_model: response(Endpoint::TwinModel)?,
            site_details: response(Endpoint::SiteDetails)?,
            ontology: response(Endpoint::Ontology)?,
            forecast: response(Endpoint::Forecast)?,
            error_envelope: ContractSchema::compile("error_envelope", error_envelope_schema())?,
        })
    }

    /// Returns the success-response schema for `endpoint`.
    #[must_use]
    pub const fn response(&self, endpoint: Endpoint) -> &ContractSchema {
        match endpoint {
            Endpoint::TwinModel => &self.twin_model,
            Endpoint::SiteDetails => &self.site_details,
            Endpoint::Ontology => &self.ontology,
            Endpoint::Forecast => &self.forecast,
        }
    }

    /// Returns the error envelope schema.
    #[must_use]
    pub const fn error_envelope(&self) -> &ContractSchema {
        &self.error_envelope
    }
}

// ============================================================================
// SECTION: Error Mapping
// ============================================================================

/// Maps one validator error onto a path-addressed violation.
fn violation_from(
    schema: &Value,
    instance: &Value,
    instance_pointer: &str,
    schema_pointer: &str,
    message: String,
) -> ShapeViolation {
    let target = instance.pointer(instance_pointer);
    let (parent, keyword) = split_keyword(schema_pointer);
    let rule = schema.pointer(parent);
    let constraint = |message: String| ViolationKind::Constraint {
        keyword: keyword.to_string(),
        message,
    };
    let kind = match keyword {
        "required" => first_missing(rule, target).map_or_else(
            || constraint(message),
            |field| ViolationKind::MissingField {
                field,
            },
        ),
        "type" => ViolationKind::WrongType {
            expected: rule.and_then(|rule| rule.get("type")).map_or("declared type", type_label),
            actual: target.map_or("nothing", json_type_label),
        },
        "minLength" if target.and_then(Value::as_str) == Some("") => ViolationKind::EmptyString,
        "minItems" if target.and_then(Value::as_array).is_some_and(Vec::is_empty) => {
            ViolationKind::EmptyArray
        }
        _ => constraint(message),
    };
    ShapeViolation::new(dollar_path(instance, instance_pointer), kind)
}

/// Splits a schema pointer into the owning subschema pointer and its keyword.
fn split_keyword(pointer: &str) -> (&str, &str) {
    let mut rest = pointer;
    while let Some((head, last)) = rest.rsplit_once('/') {
        if !last.is_empty() && !last.bytes().all(|byte| byte.is_ascii_digit()) {
            return (head, last);
        }
        rest = head;
    }
    ("", rest)
}

/// Returns the first name under `required` that the target object lacks.
fn first_missing(rule: Option<&Value>, target: Option<&Value>) -> Option<String> {
    let object = target?.as_object()?;
    rule?
        .get("required")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .find(|name| !object.contains_key(*name))
        .map(str::to_string)
}

/// Label for a schema `type` keyword value.
fn type_label(declared: &Value) -> &'static str {
    match declared {
        Value::String(name) => match name.as_str() {
            "object" => "object",
            "array" => "array",
            "string" => "string",
            "number" => "number",
            "integer" => "integer",
            "boolean" => "boolean",
            "null" => "null",
            _ => "declared type",
        },
        Value::Array(names) => {
            let has = |wanted: &str| names.iter().any(|name| name.as_str() == Some(wanted));
            if names.len() == 2 && has("string") && has("null") {
                "string or null"
            } else {
                "one of the declared types"
            }
        }
        _ => "declared type",
    }
}

/// Converts an RFC 6901 instance pointer into a `$`-rooted path.
fn dollar_path(instance: &Value, pointer: &str) -> String {
    let mut path = String::from("$");
    let mut node = Some(instance);
    for raw in pointer.split('/').skip(1) {
        let token = raw.replace("~1", "/").replace("~0", "~");
        match node {
            Some(Value::Array(items)) => {
                node = token.parse::<usize>().ok().and_then(|index| items.get(index));
                path = format!("{path}[{token}]");
            }
            other => {
                node = other.and_then(|value| value.get(token.as_str()));
                path = child_path(&path, &token);
            }
        }
    }
    path
}

// ============================================================================
// SECTION: Path Helpers
// ============================================================================

/// Returns a stable label for the JSON type of `value`.
#[must_use]
pub const fn json_type_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Appends an object key to a `$`-rooted path, quoting keys that are not identifiers.
#[must_use]
pub fn child_path(parent: &str, key: &str) -> String {
    let plain = key.chars().next().is_some_and(|first| !first.is_ascii_digit())
        && key.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if plain {
        format!("{parent}.{key}")
    } else {
        let escaped = key.replace('\\', "\\\\").replace('"', "\\\"");
        format!("{parent}[\"{escaped}\"]")
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
