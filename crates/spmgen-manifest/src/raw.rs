//! Document-shaped structs decoded from a manifest that already passed
//! the partition schema.
//!
//! Optional fields stay optional here; defaults are applied when the
//! [`Manifest`](crate::Manifest) is built so that "absent" and "present
//! but incomplete" can still be told apart.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use spmgen_core::IntLiteral;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawManifest {
    pub name: String,
    pub id: IntLiteral,
    pub priority: String,
    pub entry_point: String,
    pub stack_size: IntLiteral,
    pub heap_size: IntLiteral,
    pub source_files: Vec<String>,
    #[serde(default)]
    pub secure_functions: Vec<RawSecureFunction>,
    #[serde(default)]
    pub irqs: Vec<RawIrq>,
    #[serde(default)]
    pub extern_sfids: Vec<String>,
    #[serde(default)]
    pub mmio_regions: Vec<RawMmioRegion>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawSecureFunction {
    pub sfid: String,
    pub signal: String,
    #[serde(default)]
    pub non_secure_clients: ClientAccess,
    #[serde(default)]
    pub minor_version: Option<IntLiteral>,
    #[serde(default)]
    pub minor_policy: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawIrq {
    pub line_num: IntLiteral,
    pub signal: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawMmioRegion {
    Named {
        name: String,
        permission: String,
    },
    Range {
        base: String,
        size: IntLiteral,
        permission: String,
    },
}

/// Presence state of a secure function's `non_secure_clients` entry.
///
/// The entry is either a boolean or an object `{"allowed": bool}`. A
/// missing entry and an object without `allowed` resolve differently,
/// so the state is kept explicit until the model is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClientAccess {
    /// The key is not in the document.
    #[default]
    Absent,
    /// A boolean was given, directly or as `allowed`.
    Declared(bool),
    /// The key is present but carries no usable boolean.
    Incomplete,
}

impl ClientAccess {
    /// Absent entries allow non-secure callers; incomplete ones do not.
    pub fn resolve(self) -> bool {
        match self {
            Self::Absent => true,
            Self::Declared(allowed) => allowed,
            Self::Incomplete => false,
        }
    }
}

impl<'de> Deserialize<'de> for ClientAccess {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Bool(allowed) => Self::Declared(allowed),
            Value::Object(map) => match map.get("allowed").and_then(Value::as_bool) {
                Some(allowed) => Self::Declared(allowed),
                None => Self::Incomplete,
            },
            _ => Self::Incomplete,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(entry: Value) -> RawSecureFunction {
        serde_json::from_value(entry).unwrap()
    }

    #[test]
    fn absent_client_access_resolves_true() {
        let sf = decode(json!({"sfid": "SFID1", "signal": "SFID1"}));
        assert_eq!(sf.non_secure_clients, ClientAccess::Absent);
        assert!(sf.non_secure_clients.resolve());
    }

    #[test]
    fn incomplete_client_access_resolves_false() {
        let sf = decode(json!({"sfid": "SFID1", "signal": "SFID1", "non_secure_clients": {}}));
        assert_eq!(sf.non_secure_clients, ClientAccess::Incomplete);
        assert!(!sf.non_secure_clients.resolve());
    }

    #[test]
    fn declared_client_access_keeps_value() {
        let flat = decode(json!({"sfid": "S", "signal": "S", "non_secure_clients": false}));
        let nested = decode(json!({"sfid": "S", "signal": "S", "non_secure_clients": {"allowed": true}}));
        assert_eq!(flat.non_secure_clients, ClientAccess::Declared(false));
        assert_eq!(nested.non_secure_clients, ClientAccess::Declared(true));
    }

    #[test]
    fn region_forms_decode() {
        let named: RawMmioRegion =
            serde_json::from_value(json!({"name": "UART0", "permission": "READ-ONLY"})).unwrap();
        let range: RawMmioRegion = serde_json::from_value(
            json!({"base": "0x40000000", "size": "0x1000", "permission": "READ-WRITE"}),
        )
        .unwrap();
        assert!(matches!(named, RawMmioRegion::Named { .. }));
        assert!(matches!(range, RawMmioRegion::Range { .. }));
    }
}
