//! # Cross-Manifest Consistency
//!
//! All-or-nothing gate over a set of already-built manifests.
//!
//! ## Checks (in this order)
//!
//! 1. partition names are unique,
//! 2. partition ids are unique,
//! 3. secure function sfids are unique,
//! 4. secure function signals are unique,
//! 5. IRQ signals are unique,
//! 6. IRQ line numbers are unique,
//! 7. every extern SFID is defined by some partition.
//!
//! Checks 1–6 compare every manifest against every other one; the first
//! collision found (in manifest order) is reported with both owners.
//! Check 7 is the set difference between all extern SFIDs and all
//! defined sfids, and reports every unresolved identifier at once.
//! The fixed order keeps the reported error stable when one fixture
//! breaks several rules.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::path::PathBuf;

use spmgen_core::PartitionId;
use thiserror::Error;

use crate::manifest::Manifest;

/// Identifies the partition on one side of a collision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRef {
    /// Partition name.
    pub name: String,
    /// Manifest the partition was read from.
    pub manifest_file: PathBuf,
}

impl PartitionRef {
    fn of(manifest: &Manifest) -> Self {
        Self {
            name: manifest.name().to_string(),
            manifest_file: manifest.manifest_file().to_path_buf(),
        }
    }
}

impl fmt::Display for PartitionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({})", self.name, self.manifest_file.display())
    }
}

/// A rule the manifest set as a whole violates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    /// Two partitions share a name.
    #[error("partition name '{name}' is not unique, found in both {first} and {second}")]
    DuplicateName {
        /// The shared name.
        name: String,
        /// Earlier owner.
        first: PartitionRef,
        /// Later owner.
        second: PartitionRef,
    },

    /// Two partitions share an id.
    #[error("partition id {id} is not unique, found in both {first} and {second}")]
    DuplicateId {
        /// The shared id.
        id: PartitionId,
        /// Earlier owner.
        first: PartitionRef,
        /// Later owner.
        second: PartitionRef,
    },

    /// Two partitions define the same sfid.
    #[error("secure function sfid '{sfid}' is found in both {first} and {second}")]
    DuplicateSfid {
        /// The shared sfid.
        sfid: String,
        /// Earlier owner.
        first: PartitionRef,
        /// Later owner.
        second: PartitionRef,
    },

    /// Two partitions use the same secure function signal.
    #[error("secure function signal '{signal}' is found in both {first} and {second}")]
    DuplicateSignal {
        /// The shared signal.
        signal: String,
        /// Earlier owner.
        first: PartitionRef,
        /// Later owner.
        second: PartitionRef,
    },

    /// Two partitions use the same IRQ signal.
    #[error("IRQ signal '{signal}' is found in both {first} and {second}")]
    DuplicateIrqSignal {
        /// The shared signal.
        signal: String,
        /// Earlier owner.
        first: PartitionRef,
        /// Later owner.
        second: PartitionRef,
    },

    /// Two partitions claim the same interrupt line.
    #[error("IRQ line number {line_num} is found in both {first} and {second}")]
    DuplicateIrqLine {
        /// The shared line.
        line_num: u32,
        /// Earlier owner.
        first: PartitionRef,
        /// Later owner.
        second: PartitionRef,
    },

    /// Extern SFIDs that no partition defines.
    #[error("external SFID(s) {} can't be found in any partition manifest", .sfids.join(", "))]
    UnresolvedExternSfids {
        /// Every unresolved identifier, in first-reference order.
        sfids: Vec<String>,
    },
}

/// Validate a set of manifests against each other.
///
/// Reads only; the manifests are not modified.
pub fn validate_partition_manifests(manifests: &[Manifest]) -> Result<(), ConsistencyError> {
    if let Some((name, first, second)) =
        first_collision(manifests, |m| vec![m.name().to_string()])
    {
        return Err(ConsistencyError::DuplicateName { name, first, second });
    }

    if let Some((id, first, second)) = first_collision(manifests, |m| vec![m.id()]) {
        return Err(ConsistencyError::DuplicateId { id, first, second });
    }

    if let Some((sfid, first, second)) = first_collision(manifests, |m| {
        m.secure_functions().iter().map(|sf| sf.sfid.clone()).collect()
    }) {
        return Err(ConsistencyError::DuplicateSfid { sfid, first, second });
    }

    if let Some((signal, first, second)) = first_collision(manifests, |m| {
        m.secure_functions().iter().map(|sf| sf.signal.clone()).collect()
    }) {
        return Err(ConsistencyError::DuplicateSignal { signal, first, second });
    }

    if let Some((signal, first, second)) = first_collision(manifests, |m| {
        m.irqs().iter().map(|irq| irq.signal.clone()).collect()
    }) {
        return Err(ConsistencyError::DuplicateIrqSignal { signal, first, second });
    }

    if let Some((line_num, first, second)) =
        first_collision(manifests, |m| m.irqs().iter().map(|irq| irq.line_num).collect())
    {
        return Err(ConsistencyError::DuplicateIrqLine { line_num, first, second });
    }

    let defined: HashSet<&str> = manifests
        .iter()
        .flat_map(|m| m.secure_functions().iter().map(|sf| sf.sfid.as_str()))
        .collect();

    let mut unresolved: Vec<String> = Vec::new();
    for sfid in manifests.iter().flat_map(|m| m.extern_sfids().iter()) {
        if !defined.contains(sfid.as_str()) && !unresolved.contains(sfid) {
            unresolved.push(sfid.clone());
        }
    }
    if !unresolved.is_empty() {
        return Err(ConsistencyError::UnresolvedExternSfids { sfids: unresolved });
    }

    tracing::debug!(partitions = manifests.len(), "manifest set is consistent");
    Ok(())
}

/// First key claimed by two different manifests, with both owners.
fn first_collision<K, F>(manifests: &[Manifest], keys: F) -> Option<(K, PartitionRef, PartitionRef)>
where
    K: Eq + Hash + Clone,
    F: Fn(&Manifest) -> Vec<K>,
{
    let mut owners: HashMap<K, usize> = HashMap::new();
    for (index, manifest) in manifests.iter().enumerate() {
        for key in keys(manifest) {
            if let Some(&owner) = owners.get(&key) {
                if owner != index {
                    return Some((
                        key,
                        PartitionRef::of(&manifests[owner]),
                        PartitionRef::of(manifest),
                    ));
                }
            } else {
                owners.insert(key, index);
            }
        }
    }
    None
}
