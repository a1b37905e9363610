//! # Schema Validation
//!
//! Runtime validation of partition manifests against the JSON Schema
//! definition in `schemas/partition.schema.json` (Draft 2020-12).
//!
//! ## Invariant
//!
//! Schema validation runs before any manifest field is interpreted.
//! Documents that fail are rejected with structured error information:
//! the instance path, the schema path, and a readable message for each
//! violation.
//!
//! ## Schema Resolution
//!
//! The partition schema is embedded at compile time and only uses
//! internal `#/$defs/<name>` references, which the jsonschema crate
//! resolves natively. No retriever is installed, so validation never
//! touches the network.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

/// Name the embedded schema is reported under.
pub const PARTITION_SCHEMA_NAME: &str = "partition.schema.json";

const PARTITION_SCHEMA_JSON: &str = include_str!("../../../schemas/partition.schema.json");

static PARTITION_VALIDATOR: OnceLock<Result<SchemaValidator, String>> = OnceLock::new();

/// Error during schema validation.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document did not conform to the schema.
    #[error("{document} failed validation against '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the schema that was validated against.
        schema_name: String,
        /// Path or label of the offending document.
        document: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The document file could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoadError {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },
}

/// A single validation violation with structured context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// True if any violation points at `instance_path` or below it.
    pub fn touches(&self, instance_path: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.instance_path.starts_with(instance_path))
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A compiled schema backed by the `jsonschema` crate.
///
/// `SchemaValidator` is `Send + Sync`; the partition validator is built
/// once and shared for the lifetime of the process.
pub struct SchemaValidator {
    schema_name: String,
    validator: Validator,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("schema_name", &self.schema_name)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compile a validator from an already-parsed schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidatorBuildError` if the schema itself is
    /// not a valid Draft 2020-12 schema.
    pub fn from_schema(schema_name: &str, schema: &Value) -> Result<Self, SchemaError> {
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);

        let validator = opts
            .build(schema)
            .map_err(|e| SchemaError::ValidatorBuildError {
                schema_name: schema_name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            schema_name: schema_name.to_string(),
            validator,
        })
    }

    /// The shared validator for the embedded partition schema.
    ///
    /// Compiled on first use; later calls return the same instance.
    pub fn partition() -> Result<&'static SchemaValidator, SchemaError> {
        let compiled = PARTITION_VALIDATOR.get_or_init(|| {
            let schema: Value =
                serde_json::from_str(PARTITION_SCHEMA_JSON).map_err(|e| format!("invalid JSON: {e}"))?;
            Self::from_schema(PARTITION_SCHEMA_NAME, &schema).map_err(|e| e.to_string())
        });

        compiled
            .as_ref()
            .map_err(|reason| SchemaError::ValidatorBuildError {
                schema_name: PARTITION_SCHEMA_NAME.to_string(),
                reason: reason.clone(),
            })
    }

    /// Name of the schema this validator enforces.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Validate a parsed document.
    ///
    /// `document` labels the instance in error messages (usually its path).
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidationFailed` with every violation found.
    pub fn validate(&self, instance: &Value, document: &str) -> Result<(), SchemaError> {
        let errors: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(
                document,
                count = errors.len(),
                "document rejected by {}",
                self.schema_name
            );
            Err(SchemaError::ValidationFailed {
                schema_name: self.schema_name.clone(),
                document: document.to_string(),
                violations: ValidationViolations { violations: errors },
            })
        }
    }
}

/// Read a manifest document from disk.
///
/// Determines the format from the file extension (`.yaml`/`.yml` for YAML,
/// anything else is parsed as JSON).
///
/// # Errors
///
/// Returns `SchemaError::DocumentLoadError` if the file cannot be read or
/// parsed.
pub fn load_document(path: &Path) -> Result<Value, SchemaError> {
    let load_error = |reason: String| SchemaError::DocumentLoadError {
        path: path.display().to_string(),
        reason,
    };

    let content =
        std::fs::read_to_string(path).map_err(|e| load_error(format!("cannot read file: {e}")))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        "yaml" | "yml" => {
            let yaml_value: serde_yaml::Value = serde_yaml::from_str(&content)
                .map_err(|e| load_error(format!("invalid YAML: {e}")))?;
            yaml_to_json_value(&yaml_value)
                .map_err(|e| load_error(format!("YAML-to-JSON conversion failed: {e}")))
        }
        _ => serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}"))),
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Manifests only use the JSON-compatible subset of YAML; tags are
/// dropped and the tagged value kept.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
