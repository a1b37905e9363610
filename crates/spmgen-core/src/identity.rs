//! # Partition Identity
//!
//! Partition identifiers are exported to generated C sources as signed
//! 32-bit values, so only `0..=0x7FFF_FFFF` is representable. The
//! constructor is the single place that range is enforced.

use serde::{Deserialize, Serialize};

use crate::error::LiteralError;

/// Numeric identifier of a secure partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(u32);

impl PartitionId {
    /// Largest identifier a partition may use.
    pub const MAX: u32 = 0x7FFF_FFFF;

    /// Build an identifier, rejecting values outside `0..=MAX`.
    pub fn new(value: u64) -> Result<Self, LiteralError> {
        if value > u64::from(Self::MAX) {
            return Err(LiteralError::OutOfRange {
                value,
                max: u64::from(Self::MAX),
            });
        }
        // Bounded by MAX above.
        Ok(Self(value as u32))
    }

    /// The raw numeric value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PartitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_upper_bound() {
        assert_eq!(PartitionId::new(0x7FFF_FFFF).unwrap().get(), PartitionId::MAX);
    }

    #[test]
    fn rejects_full_word() {
        let err = PartitionId::new(0xFFFF_FFFF).unwrap_err();
        assert!(matches!(err, LiteralError::OutOfRange { .. }));
    }
}
