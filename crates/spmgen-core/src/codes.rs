//! # Symbolic Code Tables
//!
//! Manifests name priorities and MMIO permissions symbolically
//! (`"NORMAL"`, `"READ-ONLY"`). The resolved model stores the numeric
//! code the generated sources use, and templates turn codes back into
//! keys. Each enumeration has one entry slice: its [`CodeTable`] and
//! the enum's `as_str`/`code` both read from it, indexed by the enum
//! discriminant, so the mapping is defined exactly once.
//!
//! | Table | Key | Code |
//! |-------|-----|------|
//! | priority | `LOW` | 8 |
//! | priority | `NORMAL` | 24 |
//! | priority | `HIGH` | 40 |
//! | permission | `READ-ONLY` | 1 |
//! | permission | `READ-WRITE` | 3 |

use serde::{Serialize, Serializer};

use crate::error::SemanticError;

/// Immutable bidirectional mapping between symbolic keys and numeric codes.
#[derive(Debug)]
pub struct CodeTable {
    name: &'static str,
    entries: &'static [(&'static str, u32)],
}

impl CodeTable {
    /// Build a table. Keys and codes must both be unique.
    pub const fn new(name: &'static str, entries: &'static [(&'static str, u32)]) -> Self {
        Self { name, entries }
    }

    /// Table name used in error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Resolve a symbolic key to its code.
    pub fn code_of(&self, key: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, code)| *code)
    }

    /// Reverse a code to its symbolic key.
    pub fn key_of(&self, code: u32) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(key, _)| *key)
    }

    /// All keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(key, _)| *key)
    }
}

const PRIORITY_ENTRIES: &[(&str, u32)] = &[("LOW", 8), ("NORMAL", 24), ("HIGH", 40)];
const PERMISSION_ENTRIES: &[(&str, u32)] = &[("READ-ONLY", 1), ("READ-WRITE", 3)];

// Enum discriminants index the entry slices.
const _: () = assert!(PRIORITY_ENTRIES.len() == Priority::ALL.len());
const _: () = assert!(PERMISSION_ENTRIES.len() == MmioPermission::ALL.len());

/// CMSIS-RTOS2 thread priorities a partition may run at.
pub static PRIORITY_TABLE: CodeTable = CodeTable::new("priority", PRIORITY_ENTRIES);

/// Access permissions for memory-mapped peripheral regions.
pub static PERMISSION_TABLE: CodeTable = CodeTable::new("permission", PERMISSION_ENTRIES);

/// Scheduling priority of a partition thread.
///
/// Serializes as its numeric code, which is what templates receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// `LOW`
    Low = 0,
    /// `NORMAL`
    Normal = 1,
    /// `HIGH`
    High = 2,
}

impl Priority {
    /// Every priority, in table order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Normal, Self::High];

    /// Parse the symbolic manifest key.
    pub fn from_key(key: &str) -> Result<Self, SemanticError> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == key)
            .ok_or_else(|| SemanticError::UnknownCode {
                table: PRIORITY_TABLE.name(),
                key: key.to_string(),
            })
    }

    /// The symbolic manifest key.
    pub fn as_str(&self) -> &'static str {
        PRIORITY_ENTRIES[*self as usize].0
    }

    /// Numeric code from [`PRIORITY_TABLE`].
    pub fn code(&self) -> u32 {
        PRIORITY_ENTRIES[*self as usize].1
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

/// Access permission of an MMIO region.
///
/// Serializes as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MmioPermission {
    /// `READ-ONLY`
    ReadOnly = 0,
    /// `READ-WRITE`
    ReadWrite = 1,
}

impl MmioPermission {
    /// Every permission, in table order.
    pub const ALL: [Self; 2] = [Self::ReadOnly, Self::ReadWrite];

    /// Parse the symbolic manifest key.
    pub fn from_key(key: &str) -> Result<Self, SemanticError> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == key)
            .ok_or_else(|| SemanticError::UnknownCode {
                table: PERMISSION_TABLE.name(),
                key: key.to_string(),
            })
    }

    /// The symbolic manifest key.
    pub fn as_str(&self) -> &'static str {
        PERMISSION_ENTRIES[*self as usize].0
    }

    /// Numeric code from [`PERMISSION_TABLE`].
    pub fn code(&self) -> u32 {
        PERMISSION_ENTRIES[*self as usize].1
    }
}

impl std::fmt::Display for MmioPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MmioPermission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_codes_round_trip_through_table() {
        for p in Priority::ALL {
            assert_eq!(PRIORITY_TABLE.key_of(p.code()), Some(p.as_str()));
            assert_eq!(Priority::from_key(p.as_str()).unwrap(), p);
        }
    }

    #[test]
    fn permission_codes_round_trip_through_table() {
        for p in MmioPermission::ALL {
            assert_eq!(PERMISSION_TABLE.key_of(p.code()), Some(p.as_str()));
            assert_eq!(MmioPermission::from_key(p.as_str()).unwrap(), p);
        }
    }

    #[test]
    fn enum_codes_follow_table_entries() {
        assert_eq!(
            Priority::ALL.map(|p| (p.as_str(), p.code())),
            [("LOW", 8), ("NORMAL", 24), ("HIGH", 40)]
        );
        assert_eq!(
            MmioPermission::ALL.map(|p| (p.as_str(), p.code())),
            [("READ-ONLY", 1), ("READ-WRITE", 3)]
        );
        let keys: Vec<&str> = PRIORITY_TABLE.keys().collect();
        assert_eq!(keys, Priority::ALL.map(|p| p.as_str()));
    }

    #[test]
    fn unknown_code_has_no_key() {
        assert_eq!(PRIORITY_TABLE.key_of(9999), None);
        assert_eq!(PERMISSION_TABLE.key_of(0), None);
    }

    #[test]
    fn unknown_priority_key_is_rejected() {
        let err = Priority::from_key("URGENT").unwrap_err();
        assert_eq!(
            err,
            SemanticError::UnknownCode {
                table: "priority",
                key: "URGENT".to_string()
            }
        );
    }

    #[test]
    fn tables_have_unique_codes() {
        for table in [&PRIORITY_TABLE, &PERMISSION_TABLE] {
            let mut codes: Vec<u32> = table.keys().filter_map(|k| table.code_of(k)).collect();
            let before = codes.len();
            codes.sort_unstable();
            codes.dedup();
            assert_eq!(before, codes.len(), "duplicate code in {}", table.name());
        }
    }
}
