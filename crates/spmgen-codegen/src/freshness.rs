//! # Freshness
//!
//! Decides whether previously generated sources can be reused.
//!
//! The set is up to date only when every generated file is at least as
//! new as every manifest and every template. Any empty list, or any
//! file whose modification time cannot be read, means "regenerate".
//! The check is all or nothing: one newer input regenerates the lot.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Source of file modification times.
pub trait MtimeSource {
    /// Modification time of `path`, or `None` when it is unknown.
    fn mtime(&self, path: &Path) -> Option<SystemTime>;
}

/// Reads modification times from the file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMtime;

impl MtimeSource for FsMtime {
    fn mtime(&self, path: &Path) -> Option<SystemTime> {
        fs::metadata(path).and_then(|meta| meta.modified()).ok()
    }
}

/// [`is_up_to_date_with`] against the file system.
pub fn is_up_to_date(
    manifest_files: &[PathBuf],
    template_files: &[PathBuf],
    generated_files: &[PathBuf],
) -> bool {
    is_up_to_date_with(&FsMtime, manifest_files, template_files, generated_files)
}

/// True when the newest manifest and the newest template are no newer
/// than the oldest generated file.
pub fn is_up_to_date_with<S: MtimeSource + ?Sized>(
    source: &S,
    manifest_files: &[PathBuf],
    template_files: &[PathBuf],
    generated_files: &[PathBuf],
) -> bool {
    if manifest_files.is_empty() || template_files.is_empty() || generated_files.is_empty() {
        return false;
    }

    let times = |files: &[PathBuf]| -> Option<Vec<SystemTime>> {
        files.iter().map(|path| source.mtime(path)).collect()
    };

    let (Some(manifests), Some(templates), Some(generated)) = (
        times(manifest_files),
        times(template_files),
        times(generated_files),
    ) else {
        tracing::debug!("modification time unavailable, regenerating");
        return false;
    };

    let newest_input = manifests.into_iter().chain(templates).max();
    let oldest_output = generated.into_iter().min();
    match (newest_input, oldest_output) {
        (Some(input), Some(output)) => input <= output,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::{Duration, UNIX_EPOCH};

    struct FixedMtimes(HashMap<PathBuf, SystemTime>);

    impl FixedMtimes {
        fn new(entries: &[(&str, u64)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(path, secs)| (PathBuf::from(path), UNIX_EPOCH + Duration::from_secs(*secs)))
                    .collect(),
            )
        }
    }

    impl MtimeSource for FixedMtimes {
        fn mtime(&self, path: &Path) -> Option<SystemTime> {
            self.0.get(path).copied()
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn all_at(manifest: u64, template: u64, generated: u64) -> FixedMtimes {
        FixedMtimes::new(&[
            ("m1.json", 10),
            ("m2.json", manifest),
            ("NAME.tpl", 10),
            ("common.tpl", template),
            ("out/a.json", generated),
            ("out/common.json", 10),
        ])
    }

    fn check(source: &FixedMtimes) -> bool {
        is_up_to_date_with(
            source,
            &paths(&["m1.json", "m2.json"]),
            &paths(&["NAME.tpl", "common.tpl"]),
            &paths(&["out/a.json", "out/common.json"]),
        )
    }

    #[test]
    fn same_timestamps_are_up_to_date() {
        assert!(check(&all_at(10, 10, 10)));
    }

    #[test]
    fn newer_manifest_is_stale() {
        assert!(!check(&all_at(11, 10, 10)));
    }

    #[test]
    fn newer_template_is_stale() {
        assert!(!check(&all_at(10, 11, 10)));
    }

    #[test]
    fn oldest_output_decides() {
        assert!(!check(&all_at(10, 10, 9)));
        assert!(check(&all_at(10, 10, 11)));
    }

    #[test]
    fn empty_lists_are_stale() {
        let source = all_at(10, 10, 10);
        let manifests = paths(&["m1.json"]);
        let templates = paths(&["NAME.tpl"]);
        let generated = paths(&["out/a.json"]);
        assert!(!is_up_to_date_with(&source, &manifests, &templates, &[]));
        assert!(!is_up_to_date_with(&source, &manifests, &[], &generated));
        assert!(!is_up_to_date_with(&source, &[], &templates, &generated));
    }

    #[test]
    fn unknown_mtime_is_stale() {
        let source = all_at(10, 10, 10);
        assert!(!is_up_to_date_with(
            &source,
            &paths(&["m1.json"]),
            &paths(&["NAME.tpl"]),
            &paths(&["out/missing.json"]),
        ));
    }

    #[test]
    fn file_system_source_reports_missing_as_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present");
        std::fs::write(&present, "x").unwrap();
        assert!(FsMtime.mtime(&present).is_some());
        assert!(FsMtime.mtime(&dir.path().join("absent")).is_none());
    }
}
