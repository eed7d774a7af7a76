//! Removal of conflict-excluded files from an assembled manifest.
//!
//! Trimming only ever filters asset paths and drops whole resource entries.
//! Library nodes are never removed or reordered: other libraries may still
//! name them in their dependency edges.

use depsgen_schema::{AssetGroup, CompileLibrary, DepsManifest, RuntimeLibrary, SkipPaths, SkipSet};
use tracing::{debug, info};

/// Apply the compile and runtime skip sets to `manifest`.
///
/// Libraries not named in the applicable skip set are moved through
/// untouched. Skip-set names with no matching library are ignored.
pub fn trim(manifest: DepsManifest, compile_skip: &SkipSet, runtime_skip: &SkipSet) -> DepsManifest {
    if compile_skip.is_empty() && runtime_skip.is_empty() {
        return manifest;
    }

    let compile_libraries = manifest
        .compile_libraries
        .into_iter()
        .map(|lib| match compile_skip.paths_for(&lib.name) {
            Some(skip) => trim_compile_library(lib, skip),
            None => lib,
        })
        .collect();

    let runtime_libraries = manifest
        .runtime_libraries
        .into_iter()
        .map(|lib| match runtime_skip.paths_for(&lib.name) {
            Some(skip) => trim_runtime_library(lib, skip),
            None => lib,
        })
        .collect();

    info!(
        "trimmed manifest with {} compile and {} runtime skip entries",
        compile_skip.len(),
        runtime_skip.len()
    );

    DepsManifest {
        compile_libraries,
        runtime_libraries,
        ..manifest
    }
}

fn trim_compile_library(lib: CompileLibrary, skip: SkipPaths<'_>) -> CompileLibrary {
    let before = lib.assemblies.len();
    let assemblies = filter_paths(lib.assemblies, skip);
    debug!(
        "{}: removed {} compile assets",
        lib.name,
        before - assemblies.len()
    );
    CompileLibrary { assemblies, ..lib }
}

fn trim_runtime_library(lib: RuntimeLibrary, skip: SkipPaths<'_>) -> RuntimeLibrary {
    let runtime_assembly_groups = filter_groups(lib.runtime_assembly_groups, skip);
    let native_library_groups = filter_groups(lib.native_library_groups, skip);
    let resource_assemblies = lib
        .resource_assemblies
        .into_iter()
        .filter(|r| !skip.contains(&r.path))
        .collect();
    debug!("{}: trimmed runtime assets", lib.name);
    RuntimeLibrary {
        runtime_assembly_groups,
        native_library_groups,
        resource_assemblies,
        ..lib
    }
}

/// The skip set applies to every runtime-tag variant alike. Groups left
/// empty stay in place.
fn filter_groups(groups: Vec<AssetGroup>, skip: SkipPaths<'_>) -> Vec<AssetGroup> {
    groups
        .into_iter()
        .map(|group| AssetGroup {
            asset_paths: filter_paths(group.asset_paths, skip),
            ..group
        })
        .collect()
}

fn filter_paths(paths: Vec<String>, skip: SkipPaths<'_>) -> Vec<String> {
    paths.into_iter().filter(|p| !skip.contains(p)).collect()
}
