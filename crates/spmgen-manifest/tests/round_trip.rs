//! Property test: `Manifest::from_document(&m.to_json(), ..) == m`.

mod common;

use std::path::Path;

use proptest::prelude::*;
use serde_json::{json, Value};
use spmgen_manifest::Manifest;

fn identifier() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{0,11}"
}

fn int_or_hex(max: u32) -> impl Strategy<Value = Value> {
    (0..=max, any::<bool>()).prop_map(|(n, hex)| {
        if hex {
            json!(format!("0x{n:X}"))
        } else {
            json!(n)
        }
    })
}

fn secure_functions() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::btree_set(identifier(), 0..4).prop_flat_map(|sfids| {
        let count = sfids.len();
        (
            Just(sfids),
            prop::collection::vec(
                (
                    prop::option::of(any::<bool>()),
                    prop::option::of(1u32..100),
                    prop::option::of(prop::sample::select(vec!["strict", "relaxed", "RELAXED"])),
                ),
                count,
            ),
        )
            .prop_map(|(sfids, options)| {
                sfids
                    .into_iter()
                    .zip(options)
                    .map(|(sfid, (clients, version, policy))| {
                        let mut sf = json!({"sfid": sfid, "signal": format!("{sfid}_SIG")});
                        if let Some(clients) = clients {
                            sf["non_secure_clients"] = json!(clients);
                        }
                        if let Some(version) = version {
                            sf["minor_version"] = json!(version);
                        }
                        if let Some(policy) = policy {
                            sf["minor_policy"] = json!(policy);
                        }
                        sf
                    })
                    .collect()
            })
    })
}

fn irqs() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::btree_set(0u32..480, 1..4).prop_map(|lines| {
        lines
            .into_iter()
            .map(|line| json!({"line_num": line, "signal": format!("IRQ_{line}")}))
            .collect()
    })
}

fn regions() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(
        (
            prop::option::of(identifier()),
            any::<u32>(),
            1u32..0x10000,
            prop::sample::select(vec!["READ-ONLY", "READ-WRITE"]),
        )
            .prop_map(|(name, base, size, permission)| match name {
                Some(name) => json!({"name": name, "permission": permission}),
                None => json!({
                    "base": format!("0x{base:08X}"),
                    "size": size,
                    "permission": permission,
                }),
            }),
        0..5,
    )
}

fn manifest_document() -> impl Strategy<Value = Value> {
    (
        identifier(),
        int_or_hex(0x7FFF_FFFF),
        prop::sample::select(vec!["LOW", "NORMAL", "HIGH"]),
        int_or_hex(0x10000),
        int_or_hex(0x10000),
        secure_functions(),
        irqs(),
        regions(),
        prop::collection::btree_set(identifier(), 0..3),
    )
        .prop_map(
            |(name, id, priority, stack, heap, sfs, irqs, regions, externs)| {
                json!({
                    "name": name,
                    "id": id,
                    "priority": priority,
                    "entry_point": "partition_main",
                    "stack_size": stack,
                    "heap_size": heap,
                    "source_files": ["partition.c"],
                    "secure_functions": sfs,
                    "irqs": irqs,
                    "mmio_regions": regions,
                    "extern_sfids": externs.into_iter().collect::<Vec<_>>(),
                })
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn to_json_round_trips(doc in manifest_document()) {
        let dir = tempfile::tempdir().unwrap();
        let path = common::dump_manifest(&doc, "generated", dir.path(), true);

        let manifest = Manifest::from_json(&path).unwrap();
        let rebuilt = Manifest::from_document(&manifest.to_json(), &path).unwrap();
        prop_assert_eq!(rebuilt, manifest);
    }
}

#[test]
fn to_json_round_trips_from_relative_path() {
    // Relative to the package root, the working directory of integration tests.
    let dir = tempfile::Builder::new()
        .prefix("relative-")
        .tempdir_in(".")
        .unwrap();
    common::dump_manifest(&common::partition1(), "partition", dir.path(), true);
    let relative = Path::new(dir.path().file_name().unwrap()).join("partition.json");
    assert!(relative.is_relative());

    let manifest = Manifest::from_json(&relative).unwrap();
    assert_eq!(manifest.manifest_file(), relative.as_path());
    assert!(manifest.source_files().iter().all(|p| p.is_absolute()));
    assert_eq!(
        manifest.source_files()[0],
        std::path::absolute(dir.path().join("src1.cpp")).unwrap()
    );

    let rebuilt = Manifest::from_document(&manifest.to_json(), &relative).unwrap();
    assert_eq!(rebuilt, manifest);
}
