//! End-to-end pipeline: load, validate, check freshness, generate.

use std::fs;
use std::path::{Path, PathBuf};

use spmgen_manifest::{validate_partition_manifests, Manifest};

use crate::error::CodegenError;
use crate::freshness::is_up_to_date;
use crate::generate::{discover_templates, generate_source_files};
use crate::helpers::HelperMap;

/// Load and validate `manifest_files`, then render the templates found
/// in `templates_dir` into `output_dir` unless the existing output is
/// already up to date.
///
/// Nothing is written unless every manifest builds and the set is
/// consistent. Returns `output_dir` whether or not anything was
/// regenerated.
pub fn process_manifest_files<P: AsRef<Path>>(
    manifest_files: &[P],
    templates_dir: &Path,
    output_dir: &Path,
    extra_helpers: HelperMap,
) -> Result<PathBuf, CodegenError> {
    let manifests = manifest_files
        .iter()
        .map(Manifest::from_json)
        .collect::<Result<Vec<_>, _>>()?;
    validate_partition_manifests(&manifests)?;

    let templates = discover_templates(templates_dir)?;
    let generated = generated_files(output_dir)?;
    let inputs: Vec<PathBuf> = manifest_files.iter().map(|p| p.as_ref().to_path_buf()).collect();

    if is_up_to_date(&inputs, &templates, &generated) {
        tracing::info!(output = %output_dir.display(), "generated sources are up to date");
        return Ok(output_dir.to_path_buf());
    }

    generate_source_files(&manifests, &templates, output_dir, extra_helpers)
}

/// Regular files directly inside `output_dir`; none when it is missing.
fn generated_files(output_dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
    if !output_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(output_dir).map_err(|e| CodegenError::io(output_dir, e))? {
        let path = entry.map_err(|e| CodegenError::io(output_dir, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}
