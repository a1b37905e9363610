//! # Partition Manifest Model
//!
//! Typed, immutable representation of one secure partition.
//!
//! ## Construction Order
//!
//! 1. Schema validation ([`SchemaValidator::partition`]). No field is
//!    read before the document passes.
//! 2. Decoding and default filling:
//!    - `minor_version` defaults to 1,
//!    - `minor_policy` defaults to `strict`,
//!    - `non_secure_clients` defaults to `true` when absent and to
//!      `false` when present but incomplete (see [`ClientAccess`]).
//! 3. Semantic checks, in order: at least one secure function or IRQ;
//!    no repeated sfid, signal or IRQ line inside the partition; every
//!    source file exists relative to the manifest directory.
//!
//! Symbolic fields (priority, MMIO permission) are stored as their enum
//! and serialize as the numeric code templates consume.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use spmgen_core::{IntLiteral, LiteralError, MmioPermission, PartitionId, Priority, SemanticError};
use spmgen_schema::{load_document, SchemaError, SchemaValidator};
use thiserror::Error;

use crate::raw::{ClientAccess, RawManifest, RawMmioRegion, RawSecureFunction};

/// Failure to build a [`Manifest`] from one document.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The document could not be loaded or violates the partition schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A schema-valid document could not be decoded into the model.
    #[error("cannot decode manifest '{}': {reason}", path.display())]
    Decode {
        /// Manifest file.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// The manifest location cannot be made absolute.
    #[error("cannot resolve manifest path '{}': {source}", path.display())]
    Resolve {
        /// Manifest file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The document is well-typed but breaks a rule outside the schema.
    #[error("manifest '{}': {source}", path.display())]
    Semantic {
        /// Manifest file.
        path: PathBuf,
        /// The violated rule.
        #[source]
        source: SemanticError,
    },
}

impl ManifestError {
    /// True for schema violations (not load failures).
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Self::Schema(SchemaError::ValidationFailed { .. }))
    }

    /// The semantic rule that failed, if any.
    pub fn semantic(&self) -> Option<&SemanticError> {
        match self {
            Self::Semantic { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Minor-version compatibility policy of a secure function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MinorPolicy {
    /// Callers must request exactly the declared minor version.
    #[default]
    Strict,
    /// Callers may request any minor version up to the declared one.
    Relaxed,
}

impl MinorPolicy {
    fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "relaxed" => Some(Self::Relaxed),
            _ => None,
        }
    }

    /// Lower-case manifest spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Relaxed => "relaxed",
        }
    }
}

/// A callable entry point exposed by a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecureFunction {
    /// Identifier callers connect with.
    pub sfid: String,
    /// Signal raised in the partition when the function is called.
    pub signal: String,
    /// Whether the non-secure world may call it.
    pub non_secure_clients: bool,
    /// Minor version; defaults to 1.
    pub minor_version: u32,
    /// Minor version policy; defaults to strict.
    pub minor_policy: MinorPolicy,
}

/// An interrupt line routed to a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Irq {
    /// Interrupt line number.
    pub line_num: u32,
    /// Signal raised when the line fires.
    pub signal: String,
}

/// Where an MMIO region lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionLocation {
    /// A peripheral symbol the toolchain resolves.
    Named {
        /// Peripheral symbol.
        name: String,
    },
    /// An explicit address range.
    Range {
        /// Base address.
        base: u32,
        /// Size in bytes.
        size: u32,
    },
}

/// A memory-mapped I/O region a partition may access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MmioRegion {
    /// Address or symbol of the region.
    pub location: RegionLocation,
    /// Access permission.
    pub permission: MmioPermission,
    /// Owning partition.
    pub partition_id: PartitionId,
}

impl Serialize for MmioRegion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match &self.location {
            RegionLocation::Named { name } => map.serialize_entry("name", name)?,
            RegionLocation::Range { base, size } => {
                map.serialize_entry("base", &format_hex32(*base))?;
                map.serialize_entry("size", size)?;
            }
        }
        map.serialize_entry("permission", &self.permission)?;
        map.serialize_entry("partition_id", &self.partition_id)?;
        map.end()
    }
}

fn format_hex32(value: u32) -> String {
    format!("0x{value:08X}")
}

/// One secure partition, resolved and checked.
///
/// Serializes into the template context: codes are numeric and source
/// files are resolved paths.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    manifest_file: PathBuf,
    name: String,
    id: PartitionId,
    priority: Priority,
    entry_point: String,
    stack_size: u32,
    heap_size: u32,
    source_files: Vec<PathBuf>,
    secure_functions: Vec<SecureFunction>,
    irqs: Vec<Irq>,
    extern_sfids: Vec<String>,
    mmio_regions: Vec<MmioRegion>,
}

// The manifest location is provenance, not content.
impl PartialEq for Manifest {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.id == other.id
            && self.priority == other.priority
            && self.entry_point == other.entry_point
            && self.stack_size == other.stack_size
            && self.heap_size == other.heap_size
            && self.source_files == other.source_files
            && self.secure_functions == other.secure_functions
            && self.irqs == other.irqs
            && self.extern_sfids == other.extern_sfids
            && self.mmio_regions == other.mmio_regions
    }
}

impl Eq for Manifest {}

impl Manifest {
    /// Load and build a manifest from a JSON or YAML file.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let document = load_document(path)?;
        Self::from_document(&document, path)
    }

    /// Build a manifest from a parsed document.
    ///
    /// `manifest_file` anchors relative source paths and labels errors.
    /// Source paths are resolved against the absolute manifest directory.
    pub fn from_document(document: &Value, manifest_file: &Path) -> Result<Self, ManifestError> {
        SchemaValidator::partition()?.validate(document, &manifest_file.display().to_string())?;

        let raw: RawManifest =
            serde_json::from_value(document.clone()).map_err(|e| ManifestError::Decode {
                path: manifest_file.to_path_buf(),
                reason: e.to_string(),
            })?;

        let manifest_dir = std::path::absolute(manifest_file)
            .map_err(|source| ManifestError::Resolve {
                path: manifest_file.to_path_buf(),
                source,
            })?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let manifest = Self::build(raw, manifest_file, &manifest_dir).map_err(|source| {
            ManifestError::Semantic {
                path: manifest_file.to_path_buf(),
                source,
            }
        })?;

        tracing::debug!(
            partition = %manifest.name,
            id = %manifest.id,
            file = %manifest_file.display(),
            "loaded partition manifest"
        );
        Ok(manifest)
    }

    fn build(
        raw: RawManifest,
        manifest_file: &Path,
        manifest_dir: &Path,
    ) -> Result<Self, SemanticError> {
        let name = raw.name;
        let literal = |field: &'static str, result: Result<u32, LiteralError>| {
            result.map_err(|source| SemanticError::InvalidLiteral {
                partition: name.clone(),
                field,
                source,
            })
        };

        let id = raw
            .id
            .resolve(u64::from(PartitionId::MAX))
            .and_then(PartitionId::new)
            .map_err(|source| SemanticError::InvalidLiteral {
                partition: name.clone(),
                field: "id",
                source,
            })?;
        let stack_size = literal("stack_size", raw.stack_size.resolve_u32())?;
        let heap_size = literal("heap_size", raw.heap_size.resolve_u32())?;

        let secure_functions = raw
            .secure_functions
            .into_iter()
            .map(|sf| resolve_secure_function(&name, sf))
            .collect::<Result<Vec<_>, _>>()?;

        let irqs = raw
            .irqs
            .into_iter()
            .map(|irq| -> Result<Irq, SemanticError> {
                Ok(Irq {
                    line_num: literal("line_num", irq.line_num.resolve_u32())?,
                    signal: irq.signal,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mmio_regions = raw
            .mmio_regions
            .into_iter()
            .map(|region| resolve_region(&name, id, region))
            .collect::<Result<Vec<_>, _>>()?;

        let source_files: Vec<PathBuf> = raw
            .source_files
            .iter()
            .map(|file| manifest_dir.join(file))
            .collect();

        let manifest = Self {
            manifest_file: manifest_file.to_path_buf(),
            priority: Priority::from_key(&raw.priority)?,
            name,
            id,
            entry_point: raw.entry_point,
            stack_size,
            heap_size,
            source_files,
            secure_functions,
            irqs,
            extern_sfids: raw.extern_sfids,
            mmio_regions,
        };
        manifest.check()?;
        Ok(manifest)
    }

    fn check(&self) -> Result<(), SemanticError> {
        if self.secure_functions.is_empty() && self.irqs.is_empty() {
            return Err(SemanticError::NoSecureFunctionsOrIrqs {
                partition: self.name.clone(),
            });
        }

        self.check_unique(
            "secure function sfid",
            self.secure_functions.iter().map(|sf| sf.sfid.clone()),
        )?;
        self.check_unique(
            "secure function signal",
            self.secure_functions.iter().map(|sf| sf.signal.clone()),
        )?;
        self.check_unique("IRQ signal", self.irqs.iter().map(|irq| irq.signal.clone()))?;
        self.check_unique("IRQ line number", self.irqs.iter().map(|irq| irq.line_num.to_string()))?;

        if let Some(missing) = self.source_files.iter().find(|path| !path.is_file()) {
            return Err(SemanticError::MissingSourceFile {
                partition: self.name.clone(),
                path: missing.clone(),
            });
        }
        Ok(())
    }

    fn check_unique(
        &self,
        field: &'static str,
        values: impl Iterator<Item = String>,
    ) -> Result<(), SemanticError> {
        let mut seen = HashSet::new();
        for value in values {
            if !seen.insert(value.clone()) {
                return Err(SemanticError::DuplicateInPartition {
                    partition: self.name.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Render back into a schema-valid manifest document.
    ///
    /// Symbolic fields use their keys, region bases are `0x%08X` strings
    /// and source files are the resolved absolute paths.
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "id": self.id.get(),
            "priority": self.priority.as_str(),
            "entry_point": self.entry_point,
            "stack_size": self.stack_size,
            "heap_size": self.heap_size,
            "source_files": self
                .source_files
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>(),
            "secure_functions": self.secure_functions.iter().map(|sf| json!({
                "sfid": sf.sfid,
                "signal": sf.signal,
                "non_secure_clients": sf.non_secure_clients,
                "minor_version": sf.minor_version,
                "minor_policy": sf.minor_policy.as_str(),
            })).collect::<Vec<_>>(),
            "irqs": self.irqs.iter().map(|irq| json!({
                "line_num": irq.line_num,
                "signal": irq.signal,
            })).collect::<Vec<_>>(),
            "extern_sfids": self.extern_sfids,
            "mmio_regions": self.mmio_regions.iter().map(|region| {
                let mut entry = match &region.location {
                    RegionLocation::Named { name } => json!({ "name": name }),
                    RegionLocation::Range { base, size } => json!({
                        "base": format_hex32(*base),
                        "size": size,
                    }),
                };
                entry["permission"] = Value::from(region.permission.as_str());
                entry
            }).collect::<Vec<_>>(),
        })
    }

    /// File the manifest was read from.
    pub fn manifest_file(&self) -> &Path {
        &self.manifest_file
    }

    /// Partition name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Partition identifier.
    pub fn id(&self) -> PartitionId {
        self.id
    }

    /// Thread priority.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Entry function symbol.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Thread stack size in bytes.
    pub fn stack_size(&self) -> u32 {
        self.stack_size
    }

    /// Heap size in bytes.
    pub fn heap_size(&self) -> u32 {
        self.heap_size
    }

    /// Source files as absolute paths, resolved against the manifest directory.
    pub fn source_files(&self) -> &[PathBuf] {
        &self.source_files
    }

    /// Secure functions this partition defines.
    pub fn secure_functions(&self) -> &[SecureFunction] {
        &self.secure_functions
    }

    /// IRQs routed to this partition.
    pub fn irqs(&self) -> &[Irq] {
        &self.irqs
    }

    /// SFIDs this partition calls but does not define.
    pub fn extern_sfids(&self) -> &[String] {
        &self.extern_sfids
    }

    /// MMIO regions this partition may access.
    pub fn mmio_regions(&self) -> &[MmioRegion] {
        &self.mmio_regions
    }
}

fn resolve_secure_function(
    partition: &str,
    raw: RawSecureFunction,
) -> Result<SecureFunction, SemanticError> {
    let minor_version = match raw.minor_version {
        None => 1,
        Some(literal) => {
            let version = literal
                .resolve_u32()
                .map_err(|source| SemanticError::InvalidLiteral {
                    partition: partition.to_string(),
                    field: "minor_version",
                    source,
                })?;
            if version == 0 {
                return Err(SemanticError::InvalidLiteral {
                    partition: partition.to_string(),
                    field: "minor_version",
                    source: LiteralError::OutOfRange { value: 0, max: u64::from(u32::MAX) },
                });
            }
            version
        }
    };

    let minor_policy = match raw.minor_policy.as_deref() {
        None => MinorPolicy::default(),
        Some(key) => MinorPolicy::from_key(key).ok_or_else(|| SemanticError::UnknownCode {
            table: "minor policy",
            key: key.to_string(),
        })?,
    };

    Ok(SecureFunction {
        sfid: raw.sfid,
        signal: raw.signal,
        non_secure_clients: ClientAccess::resolve(raw.non_secure_clients),
        minor_version,
        minor_policy,
    })
}

fn resolve_region(
    partition: &str,
    partition_id: PartitionId,
    raw: RawMmioRegion,
) -> Result<MmioRegion, SemanticError> {
    let invalid = |field: &'static str, source: LiteralError| SemanticError::InvalidLiteral {
        partition: partition.to_string(),
        field,
        source,
    };

    let (location, permission) = match raw {
        RawMmioRegion::Named { name, permission } => (RegionLocation::Named { name }, permission),
        RawMmioRegion::Range { base, size, permission } => {
            let base = IntLiteral::Hex(base)
                .resolve_u32()
                .map_err(|e| invalid("base", e))?;
            let size = size.resolve_u32().map_err(|e| invalid("size", e))?;
            (RegionLocation::Range { base, size }, permission)
        }
    };

    Ok(MmioRegion {
        location,
        permission: MmioPermission::from_key(&permission)?,
        partition_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_policy_is_case_insensitive() {
        assert_eq!(MinorPolicy::from_key("RELAXED"), Some(MinorPolicy::Relaxed));
        assert_eq!(MinorPolicy::from_key("strict"), Some(MinorPolicy::Strict));
        assert_eq!(MinorPolicy::from_key("loose"), None);
    }

    #[test]
    fn region_serializes_codes_and_hex_base() {
        let region = MmioRegion {
            location: RegionLocation::Range { base: 0x4000_0000, size: 4096 },
            permission: MmioPermission::ReadWrite,
            partition_id: PartitionId::new(7).unwrap(),
        };
        let value = serde_json::to_value(&region).unwrap();
        assert_eq!(value["base"], "0x40000000");
        assert_eq!(value["size"], 4096);
        assert_eq!(value["permission"], 3);
        assert_eq!(value["partition_id"], 7);
        assert!(value.get("name").is_none());
    }

    #[test]
    fn named_region_has_no_base() {
        let region = MmioRegion {
            location: RegionLocation::Named { name: "UART0".into() },
            permission: MmioPermission::ReadOnly,
            partition_id: PartitionId::new(1).unwrap(),
        };
        let value = serde_json::to_value(&region).unwrap();
        assert_eq!(value["name"], "UART0");
        assert!(value.get("base").is_none());
    }
}
