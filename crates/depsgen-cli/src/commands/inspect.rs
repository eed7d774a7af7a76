use super::{colorize_type, json_pretty, EXIT_SUCCESS};
use depsgen_schema::DepsManifest;
use std::path::Path;

pub fn run(manifest_path: &Path, json: bool) -> Result<u8, String> {
    let manifest =
        DepsManifest::read_from_file(manifest_path).map_err(|e| format!("input error: {e}"))?;

    if json {
        let runtime: Vec<_> = manifest
            .runtime_libraries
            .iter()
            .map(|lib| {
                serde_json::json!({
                    "name": lib.name,
                    "version": lib.version,
                    "type": lib.library_type,
                    "assets": lib.all_asset_paths().count(),
                    "resources": lib.resource_assemblies.len(),
                    "store": lib.runtime_store_manifest_name,
                })
            })
            .collect();
        let payload = serde_json::json!({
            "target": manifest.target.name(),
            "compile_libraries": manifest.compile_libraries.len(),
            "runtime": runtime,
        });
        println!("{}", json_pretty(&payload)?);
        return Ok(EXIT_SUCCESS);
    }

    println!("target: {}", manifest.target.name());
    println!();
    println!("{:<40} {:<14} {:<18} ASSETS", "RUNTIME LIBRARY", "VERSION", "TYPE");
    for lib in &manifest.runtime_libraries {
        let mut line = format!(
            "{:<40} {:<14} {:<18} {}",
            lib.name,
            lib.version,
            colorize_type(lib.library_type),
            lib.all_asset_paths().count()
        );
        if let Some(store) = &lib.runtime_store_manifest_name {
            line.push_str(&format!("  (store: {store})"));
        }
        println!("{line}");
    }
    println!();
    println!("{:<40} {:<14} {:<18} ASSETS", "COMPILE LIBRARY", "VERSION", "TYPE");
    for lib in &manifest.compile_libraries {
        println!(
            "{:<40} {:<14} {:<18} {}",
            lib.name,
            lib.version,
            colorize_type(lib.library_type),
            lib.assemblies.len()
        );
    }
    Ok(EXIT_SUCCESS)
}
