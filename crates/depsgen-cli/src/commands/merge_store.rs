use super::{json_pretty, EXIT_SUCCESS};
use std::path::PathBuf;

pub fn run(descriptors: &[PathBuf], json: bool) -> Result<u8, String> {
    let index = depsgen_core::merge_store_manifests(descriptors)
        .map_err(|e| format!("store descriptor error: {e}"))?;

    let Some(index) = index else {
        if json {
            println!("null");
        } else {
            println!("no store descriptors given; store filtering disabled");
        }
        return Ok(EXIT_SUCCESS);
    };

    if json {
        let entries: Vec<_> = index
            .iter()
            .map(|(id, label)| {
                serde_json::json!({
                    "id": id.name,
                    "version": id.version,
                    "sources": label,
                })
            })
            .collect();
        println!("{}", json_pretty(&entries)?);
    } else if index.is_empty() {
        println!("no packages declared");
    } else {
        println!("{:<40} {:<16} SOURCES", "PACKAGE", "VERSION");
        for (id, label) in index.iter() {
            println!("{:<40} {:<16} {label}", id.name, id.version);
        }
    }
    Ok(EXIT_SUCCESS)
}
