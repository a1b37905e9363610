//! Shared fixtures for manifest integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Find the repository root.
pub fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

/// Load one of the fixture manifests in `testdata/manifests/`.
pub fn fixture(name: &str) -> Value {
    let path = repo_root().join("testdata/manifests").join(format!("{name}.json"));
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read fixture {}: {e}", path.display()));
    serde_json::from_str(&content).unwrap()
}

/// The first valid fixture partition.
pub fn partition1() -> Value {
    fixture("test_partition")
}

/// The second valid fixture partition, consistent with the first.
pub fn partition2() -> Value {
    fixture("test_partition2")
}

/// Copy of `manifest` with `key` replaced.
pub fn with(manifest: &Value, key: &str, value: Value) -> Value {
    let mut doc = manifest.clone();
    doc[key] = value;
    doc
}

/// Copy of `manifest` without the given keys.
pub fn without(manifest: &Value, keys: &[&str]) -> Value {
    let mut doc = manifest.clone();
    let map = doc.as_object_mut().unwrap();
    for key in keys {
        map.remove(*key);
    }
    doc
}

/// Write `manifest` as `<dir>/<test_name>.json`.
///
/// When `create_files` is set, every entry of `source_files` is created
/// next to the manifest.
pub fn dump_manifest(manifest: &Value, test_name: &str, dir: &Path, create_files: bool) -> PathBuf {
    let path = dir.join(format!("{test_name}.json"));
    std::fs::write(&path, serde_json::to_string_pretty(manifest).unwrap()).unwrap();

    if create_files {
        if let Some(files) = manifest.get("source_files").and_then(Value::as_array) {
            for file in files.iter().filter_map(Value::as_str) {
                std::fs::write(dir.join(file), file).unwrap();
            }
        }
    }
    path
}
