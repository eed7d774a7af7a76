use super::{json_pretty, EXIT_SUCCESS};
use depsgen_schema::{DepsManifest, SkipEntry, SkipSets};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// A standalone skip list: `[[skip]]` tables with `item_path` and
/// `conflict_item_type`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SkipFile {
    #[serde(default)]
    skip: Vec<SkipEntry>,
}

pub fn run(
    manifest_path: &Path,
    skip_path: &Path,
    package_folders: &[String],
    output: Option<&Path>,
    json: bool,
) -> Result<u8, String> {
    let manifest =
        DepsManifest::read_from_file(manifest_path).map_err(|e| format!("input error: {e}"))?;
    let content = std::fs::read_to_string(skip_path)
        .map_err(|e| format!("input error: failed to read {}: {e}", skip_path.display()))?;
    let skip_file: SkipFile = toml::from_str(&content)
        .map_err(|e| format!("input error: failed to parse {}: {e}", skip_path.display()))?;

    let sets = SkipSets::from_entries(&skip_file.skip, package_folders);
    debug!(
        "{} skip entries: {} compile libraries, {} runtime libraries",
        skip_file.skip.len(),
        sets.compile.len(),
        sets.runtime.len()
    );
    let before = asset_count(&manifest);
    let trimmed = if sets.is_empty() {
        manifest
    } else {
        depsgen_core::trim(manifest, &sets.compile, &sets.runtime)
    };
    let after = asset_count(&trimmed);

    let out = output.unwrap_or(manifest_path);
    trimmed
        .write_to_file(out)
        .map_err(|e| format!("output error: {e}"))?;

    if json {
        let payload = serde_json::json!({
            "output": out,
            "compile_skip_libraries": sets.compile.len(),
            "runtime_skip_libraries": sets.runtime.len(),
            "assets_removed": before - after,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "removed {} assets ({} compile, {} runtime libraries named)",
            before - after,
            sets.compile.len(),
            sets.runtime.len()
        );
        println!("wrote: {}", out.display());
    }
    Ok(EXIT_SUCCESS)
}

fn asset_count(manifest: &DepsManifest) -> usize {
    let compile: usize = manifest
        .compile_libraries
        .iter()
        .map(|l| l.assemblies.len())
        .sum();
    let runtime: usize = manifest
        .runtime_libraries
        .iter()
        .map(|l| l.all_asset_paths().count() + l.resource_assemblies.len())
        .sum();
    compile + runtime
}
