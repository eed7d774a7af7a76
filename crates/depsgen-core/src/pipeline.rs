use crate::builder::ManifestBuilder;
use crate::merger::merge_store_manifests;
use crate::trimmer::trim;
use crate::CoreError;
use depsgen_schema::{DepsManifest, GenerateRequest, ResolvedClosure, SkipSets};
use std::path::PathBuf;
use tracing::{debug, info};

/// Outcome of a generation run.
#[derive(Debug)]
pub struct GenerateResult {
    pub manifest: DepsManifest,
    /// Files written by the run, for incremental-build bookkeeping.
    pub files_written: Vec<PathBuf>,
}

/// Merge store descriptors, assemble the manifest and apply the skip list,
/// without touching the output path.
pub fn assemble(
    request: &GenerateRequest,
    closure: &ResolvedClosure,
) -> Result<DepsManifest, CoreError> {
    let filtered = merge_store_manifests(&request.store_manifests)?;
    match &filtered {
        Some(index) => debug!("{} packages present in runtime stores", index.len()),
        None => debug!("no runtime store filtering requested"),
    }

    let manifest = ManifestBuilder::new(&request.project, closure)
        .with_framework_references(&request.framework_references)
        .with_direct_references(&request.direct_references)
        .with_project_references(&request.project_references)
        .with_private_assets(&request.private_assets)
        .with_compilation_options(request.compilation_options.clone())
        .with_reference_assemblies_path(request.reference_assemblies_path.as_deref())
        .with_filtered_packages(filtered.as_ref())
        .build()?;

    let skip = SkipSets::from_entries(&request.skip, &request.package_folders);
    if skip.is_empty() {
        debug!("no conflict skip entries, trimming skipped");
        return Ok(manifest);
    }
    Ok(trim(manifest, &skip.compile, &skip.runtime))
}

/// Run a full generation: read the closure, assemble, and write the
/// manifest atomically to `request.output`.
///
/// Nothing is written when any step fails.
pub fn generate(request: &GenerateRequest) -> Result<GenerateResult, CoreError> {
    info!("reading resolved closure from {}", request.closure.display());
    let closure = ResolvedClosure::read_from_file(&request.closure)?;

    let manifest = assemble(request, &closure)?;

    manifest.write_to_file(&request.output)?;
    info!("wrote deps manifest to {}", request.output.display());

    Ok(GenerateResult {
        manifest,
        files_written: vec![request.output.clone()],
    })
}
