//! # Source Generation
//!
//! Renders Handlebars templates against a validated manifest set.
//!
//! ## Template Naming
//!
//! | File name | Rendered | Output name |
//! |-----------|----------|-------------|
//! | contains `NAME` | once per partition | `NAME` → lower-cased partition name, `.tpl` dropped |
//! | starts with `common.` | once for the whole set | `.tpl` dropped |
//!
//! Every artifact is rendered in memory before the first file is
//! written. A failing template leaves the output directory untouched.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use spmgen_manifest::{Manifest, MmioRegion};

use crate::error::CodegenError;
use crate::helpers::{register_builtins, HelperMap};

/// Placeholder marking a per-partition template.
pub const NAME_PLACEHOLDER: &str = "NAME";

/// File name prefix marking the common template.
pub const COMMON_PREFIX: &str = "common.";

/// Extension of template files.
pub const TEMPLATE_EXTENSION: &str = "tpl";

/// How often a template is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Once per partition manifest.
    PerPartition,
    /// Once against the whole set.
    Common,
}

impl TemplateKind {
    /// Classify a template by its file name.
    pub fn of(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.contains(NAME_PLACEHOLDER) {
            Some(Self::PerPartition)
        } else if name.starts_with(COMMON_PREFIX) {
            Some(Self::Common)
        } else {
            None
        }
    }
}

/// Output file name for `template_name`, rendered for `partition`.
///
/// ```
/// use spmgen_codegen::output_file_name;
///
/// assert_eq!(output_file_name("NAME.json.tpl", Some("TEST_PARTITION")), "test_partition.json");
/// assert_eq!(output_file_name("common.json.tpl", None), "common.json");
/// ```
pub fn output_file_name(template_name: &str, partition: Option<&str>) -> String {
    let stem = template_name
        .strip_suffix(".tpl")
        .unwrap_or(template_name);
    match partition {
        Some(name) => stem.replace(NAME_PLACEHOLDER, &name.to_lowercase()),
        None => stem.to_string(),
    }
}

/// Template files in `dir`, sorted by file name.
///
/// Only regular files with the `.tpl` extension are considered. Files
/// that match neither naming rule are skipped with a warning.
pub fn discover_templates(dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
    let entries = fs::read_dir(dir).map_err(|e| CodegenError::io(dir, e))?;

    let mut templates = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| CodegenError::io(dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
            continue;
        }
        if TemplateKind::of(&path).is_none() {
            tracing::warn!(template = %path.display(), "skipping unrecognized template");
            continue;
        }
        templates.push(path);
    }
    templates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    tracing::debug!(dir = %dir.display(), count = templates.len(), "discovered templates");
    Ok(templates)
}

/// Context of the common template.
#[derive(Debug, Serialize)]
struct CommonContext<'a> {
    num_of_partitions: usize,
    partition_names: Vec<&'a str>,
    partitions: &'a [Manifest],
    regions: Vec<&'a MmioRegion>,
    num_of_region_pairs: usize,
}

impl<'a> CommonContext<'a> {
    fn new(manifests: &'a [Manifest]) -> Self {
        let regions: Vec<&MmioRegion> = manifests
            .iter()
            .flat_map(|m| m.mmio_regions().iter())
            .collect();
        Self {
            num_of_partitions: manifests.len(),
            partition_names: manifests.iter().map(Manifest::name).collect(),
            partitions: manifests,
            num_of_region_pairs: region_pairs(regions.len()),
            regions,
        }
    }
}

/// Unordered pairs among `n` regions.
fn region_pairs(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Rendered files, keyed by output path, waiting to be written.
#[derive(Default)]
struct Artifacts {
    files: Vec<(PathBuf, String)>,
    owners: HashMap<PathBuf, String>,
}

impl Artifacts {
    /// Fails if `path` already belongs to another target, as happens for
    /// partition names that differ only in case.
    fn push(&mut self, path: PathBuf, target: &str, content: String) -> Result<(), CodegenError> {
        if let Some(first) = self.owners.get(&path) {
            return Err(CodegenError::OutputCollision {
                path,
                first: first.clone(),
                second: target.to_string(),
            });
        }
        self.owners.insert(path.clone(), target.to_string());
        self.files.push((path, content));
        Ok(())
    }
}

/// Render `templates` for `manifests` into `output_dir`.
///
/// `extra_helpers` are registered after the built-in helpers and replace
/// any of the same name. Two artifacts with the same output path are an
/// error, raised before anything is written. Returns `output_dir`.
pub fn generate_source_files(
    manifests: &[Manifest],
    templates: &[PathBuf],
    output_dir: &Path,
    extra_helpers: HelperMap,
) -> Result<PathBuf, CodegenError> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(false);
    registry.register_escape_fn(handlebars::no_escape);
    register_builtins(&mut registry);
    for (name, helper) in extra_helpers {
        registry.register_helper(&name, helper);
    }

    let mut compiled = Vec::with_capacity(templates.len());
    for path in templates {
        let kind = TemplateKind::of(path)
            .ok_or_else(|| CodegenError::UnrecognizedTemplate { path: path.clone() })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?;
        registry
            .register_template_string(&name, source)
            .map_err(|e| CodegenError::TemplateSyntax {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        compiled.push((name, kind));
    }

    let render = |template: &str, target: &str, context: &serde_json::Value| {
        registry
            .render(template, context)
            .map_err(|e| CodegenError::Render {
                template: template.to_string(),
                target: target.to_string(),
                reason: e.to_string(),
            })
    };

    let mut artifacts = Artifacts::default();
    for (template, kind) in &compiled {
        match kind {
            TemplateKind::PerPartition => {
                for manifest in manifests {
                    let context = serde_json::to_value(manifest)?;
                    let content = render(template, manifest.name(), &context)?;
                    let file = output_file_name(template, Some(manifest.name()));
                    artifacts.push(output_dir.join(file), manifest.name(), content)?;
                }
            }
            TemplateKind::Common => {
                let context = serde_json::to_value(CommonContext::new(manifests))?;
                let content = render(template, "common", &context)?;
                let file = output_file_name(template, None);
                artifacts.push(output_dir.join(file), "common", content)?;
            }
        }
    }

    fs::create_dir_all(output_dir).map_err(|e| CodegenError::io(output_dir, e))?;
    for (path, content) in &artifacts.files {
        fs::write(path, content).map_err(|e| CodegenError::io(path, e))?;
        tracing::debug!(file = %path.display(), "wrote generated source");
    }

    tracing::info!(
        partitions = manifests.len(),
        files = artifacts.files.len(),
        output = %output_dir.display(),
        "generated sources"
    );
    Ok(output_dir.to_path_buf())
}
