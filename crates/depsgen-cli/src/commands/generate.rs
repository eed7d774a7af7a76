use super::{json_pretty, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use depsgen_schema::GenerateRequest;
use std::path::Path;
use tracing::debug;

pub fn run(request_path: &Path, output: Option<&Path>, json: bool) -> Result<u8, String> {
    let mut request = GenerateRequest::load(request_path).map_err(|e| e.to_string())?;
    if let Some(out) = output {
        request.output = out.to_path_buf();
    }
    debug!("request loaded, output {}", request.output.display());

    let pb = if json {
        None
    } else {
        Some(spinner("generating deps manifest..."))
    };

    let result = match depsgen_core::generate(&request) {
        Ok(r) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "deps manifest generated");
            }
            r
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "generation failed");
            }
            return Err(e.to_string());
        }
    };

    let manifest = &result.manifest;
    if json {
        let payload = serde_json::json!({
            "target": manifest.target.name(),
            "compile_libraries": manifest.compile_libraries.len(),
            "runtime_libraries": manifest.runtime_libraries.len(),
            "files_written": result.files_written,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("target:    {}", manifest.target.name());
        println!("compile:   {} libraries", manifest.compile_libraries.len());
        println!("runtime:   {} libraries", manifest.runtime_libraries.len());
        for file in &result.files_written {
            println!("wrote:     {}", file.display());
        }
    }
    Ok(EXIT_SUCCESS)
}
