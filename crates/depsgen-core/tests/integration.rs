use depsgen_core::{assemble, generate, merge_store_manifests, trim, ManifestBuilder};
use depsgen_schema::{
    ConflictItemType, DepsManifest, GenerateRequest, LibraryType, ResolvedClosure, SkipEntry,
    SkipSet,
};
use std::fs;
use std::path::Path;

fn write_closure(dir: &Path) -> std::path::PathBuf {
    let closure = serde_json::json!({
        "target": {
            "framework": "net6.0",
            "runtime_identifier": "linux-x64",
            "platform_library": "Microsoft.NETCore.App",
            "self_contained": false
        },
        "direct_dependencies": ["Microsoft.NETCore.App", "PackageA", "Lib"],
        "libraries": [
            {
                "name": "Microsoft.NETCore.App",
                "version": "6.0.0",
                "sha512": "sha512-platform",
                "path": "microsoft.netcore.app/6.0.0",
                "compile_assets": ["ref/net6.0/System.Runtime.dll"]
            },
            {
                "name": "PackageA",
                "version": "1.0.0",
                "sha512": "sha512-a",
                "path": "packagea/1.0.0",
                "hash_path": "packagea.1.0.0.nupkg.sha512",
                "serviceable": true,
                "dependencies": {"PackageB": "2.0.0"},
                "compile_assets": ["ref/net6.0/a.dll"],
                "runtime_assets": [
                    {"asset_paths": ["lib/net6.0/a.dll", "lib/net6.0/b.dll"]},
                    {"runtime": "win", "asset_paths": ["runtimes/win/lib/net6.0/a.dll"]}
                ],
                "resource_assemblies": [
                    {"path": "lib/net6.0/fr/a.resources.dll", "locale": "fr"}
                ]
            },
            {
                "name": "PackageB",
                "version": "2.0.0",
                "sha512": "sha512-b",
                "path": "packageb/2.0.0",
                "compile_assets": ["lib/net6.0/b.dll"],
                "runtime_assets": [{"asset_paths": ["lib/net6.0/b.dll"]}],
                "native_assets": [
                    {"runtime": "linux-x64", "asset_paths": ["runtimes/linux-x64/native/libb.so"]}
                ]
            },
            {
                "name": "Lib",
                "version": "1.0.0",
                "type": "project",
                "msbuild_project": "../Lib/Lib.csproj",
                "compile_assets": ["bin/placeholder/Lib.dll"],
                "runtime_assets": [{"asset_paths": ["bin/placeholder/Lib.dll"]}]
            }
        ],
        "runtime_graph": [
            {"runtime": "linux-x64", "fallbacks": ["linux", "unix", "any", "base"]}
        ]
    });
    let path = dir.join("closure.json");
    fs::write(&path, serde_json::to_string_pretty(&closure).unwrap()).unwrap();
    path
}

fn write_request(dir: &Path, extra: &str) -> std::path::PathBuf {
    write_closure(dir);
    let path = dir.join("depsgen.toml");
    fs::write(
        &path,
        format!(
            r#"
closure = "closure.json"
output = "App.deps.json"
package_folders = ["/pkgs"]
{extra}

[project]
path = "App.csproj"
assembly_name = "App"

[[project.resource_assemblies]]
locale = "fr"
path = "fr/App.resources.dll"

[[project_references]]
project_path = "../Lib/Lib.csproj"
name = "Lib"

[[project_references.resource_assemblies]]
locale = "es"
path = "es/Lib.resources.dll"

[compilation_options]
defines = ["TRACE"]
"#
        ),
    )
    .unwrap();
    path
}

fn runtime_names(m: &DepsManifest) -> Vec<&str> {
    m.runtime_libraries.iter().map(|l| l.name.as_str()).collect()
}

fn compile_names(m: &DepsManifest) -> Vec<&str> {
    m.compile_libraries.iter().map(|l| l.name.as_str()).collect()
}

#[test]
fn full_generation_from_request_file() {
    let dir = tempfile::tempdir().unwrap();
    let request = GenerateRequest::load(write_request(dir.path(), "")).unwrap();

    let result = generate(&request).unwrap();
    assert_eq!(result.files_written.len(), 1);

    let manifest = DepsManifest::read_from_file(dir.path().join("App.deps.json")).unwrap();
    assert_eq!(manifest, result.manifest);
    assert_eq!(manifest.target.name(), ".NETCoreApp,Version=v6.0/linux-x64");
    assert_eq!(
        compile_names(&manifest),
        vec!["App", "Microsoft.NETCore.App", "PackageA", "PackageB", "Lib"]
    );
    assert_eq!(runtime_names(&manifest), vec!["App", "PackageA", "PackageB", "Lib"]);
    assert_eq!(manifest.compilation_options.defines, vec!["TRACE"]);
    assert_eq!(manifest.runtime_graph.len(), 1);

    let lib = manifest.runtime_library("Lib").unwrap();
    assert_eq!(lib.library_type, LibraryType::Project);
    assert_eq!(lib.resource_assemblies[0].path, "es/Lib.resources.dll");
}

#[test]
fn request_skip_list_trims_both_sides_independently() {
    let dir = tempfile::tempdir().unwrap();
    let extra = r#"
[[skip]]
item_path = "/pkgs/packagea/1.0.0/ref/net6.0/a.dll"
conflict_item_type = "Reference"

[[skip]]
item_path = "/pkgs/packagea/1.0.0/lib/net6.0/a.dll"
conflict_item_type = "CopyLocal"

[[skip]]
item_path = "/pkgs/packagea/1.0.0/lib/net6.0/fr/a.resources.dll"
conflict_item_type = "CopyLocal"

[[skip]]
item_path = "/somewhere/else/a.dll"
conflict_item_type = "CopyLocal"

[[skip]]
item_path = "/pkgs/packagez/9.9.9/lib/net6.0/z.dll"
conflict_item_type = "CopyLocal"
"#;
    let request = GenerateRequest::load(write_request(dir.path(), extra)).unwrap();
    let manifest = generate(&request).unwrap().manifest;

    let compile_a = manifest.compile_library("PackageA").unwrap();
    assert!(compile_a.assemblies.is_empty());

    let runtime_a = manifest.runtime_library("PackageA").unwrap();
    assert_eq!(runtime_a.runtime_assembly_groups[0].asset_paths, vec!["lib/net6.0/b.dll"]);
    assert_eq!(
        runtime_a.runtime_assembly_groups[1].asset_paths,
        vec!["runtimes/win/lib/net6.0/a.dll"]
    );
    assert!(runtime_a.resource_assemblies.is_empty());
    assert_eq!(runtime_a.dependencies.get("PackageB").map(String::as_str), Some("2.0.0"));
    assert!(runtime_a.serviceable);
    assert_eq!(runtime_a.hash.as_deref(), Some("sha512-a"));

    assert_eq!(runtime_names(&manifest), vec!["App", "PackageA", "PackageB", "Lib"]);
}

#[test]
fn store_descriptors_label_packages_without_dropping_assets() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("aspnet.toml"),
        "[[package]]\nid = \"PackageB\"\nversion = \"2.0.0\"\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("extra.toml"),
        "[[package]]\nid = \"packageb\"\nversion = \"2.0.0\"\n",
    )
    .unwrap();
    let extra = r#"store_manifests = ["aspnet.toml", "extra.toml"]"#;
    let request = GenerateRequest::load(write_request(dir.path(), extra)).unwrap();
    let manifest = generate(&request).unwrap().manifest;

    let b = manifest.runtime_library("PackageB").unwrap();
    assert_eq!(
        b.runtime_store_manifest_name.as_deref(),
        Some("aspnet.toml;extra.toml")
    );
    assert_eq!(b.runtime_assembly_groups[0].asset_paths, vec!["lib/net6.0/b.dll"]);
    assert!(manifest
        .runtime_library("PackageA")
        .unwrap()
        .runtime_store_manifest_name
        .is_none());
}

#[test]
fn regenerating_unchanged_inputs_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let request = GenerateRequest::load(write_request(dir.path(), "")).unwrap();

    generate(&request).unwrap();
    let first = fs::read(&request.output).unwrap();
    generate(&request).unwrap();
    let second = fs::read(&request.output).unwrap();
    assert_eq!(first, second);
}

#[test]
fn trimming_scenario_package_a() {
    let dir = tempfile::tempdir().unwrap();
    let request = GenerateRequest::load(write_request(dir.path(), "")).unwrap();
    let closure = ResolvedClosure::read_from_file(&request.closure).unwrap();
    let manifest = assemble(&request, &closure).unwrap();

    let runtime_skip: SkipSet = [("PackageA", "lib/net6.0/a.dll")].into_iter().collect();
    let trimmed = trim(manifest.clone(), &SkipSet::new(), &runtime_skip);

    let a = trimmed.runtime_library("PackageA").unwrap();
    assert_eq!(a.runtime_assembly_groups[0].asset_paths, vec!["lib/net6.0/b.dll"]);
    assert_eq!(runtime_names(&trimmed), runtime_names(&manifest));
}

#[test]
fn trimming_absent_library_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let request = GenerateRequest::load(write_request(dir.path(), "")).unwrap();
    let closure = ResolvedClosure::read_from_file(&request.closure).unwrap();
    let manifest = assemble(&request, &closure).unwrap();

    let skip: SkipSet = [("PackageZ", "lib/net6.0/z.dll")].into_iter().collect();
    assert_eq!(trim(manifest.clone(), &skip, &skip), manifest);
}

#[test]
fn asset_paths_equal_original_minus_skip() {
    let dir = tempfile::tempdir().unwrap();
    let request = GenerateRequest::load(write_request(dir.path(), "")).unwrap();
    let closure = ResolvedClosure::read_from_file(&request.closure).unwrap();
    let manifest = ManifestBuilder::new(&request.project, &closure).build().unwrap();

    let skipped = ["LIB/net6.0/B.dll", "runtimes/linux-x64/native/libb.so"];
    let runtime_skip: SkipSet = skipped.iter().map(|p| ("packageb", *p)).collect();
    let trimmed = trim(manifest.clone(), &SkipSet::new(), &runtime_skip);

    let before = manifest.runtime_library("PackageB").unwrap();
    let after = trimmed.runtime_library("PackageB").unwrap();
    let expected: Vec<&str> = before
        .all_asset_paths()
        .filter(|p| !skipped.iter().any(|s| s.eq_ignore_ascii_case(p)))
        .collect();
    assert_eq!(after.all_asset_paths().collect::<Vec<_>>(), expected);

    for (b, a) in manifest.runtime_libraries.iter().zip(&trimmed.runtime_libraries) {
        if !b.name.eq_ignore_ascii_case("PackageB") {
            assert_eq!(a, b);
        }
    }
}

#[test]
fn merge_of_zero_descriptors_is_absent_not_empty() {
    assert!(merge_store_manifests(&[]).unwrap().is_none());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("none.toml");
    fs::write(&path, "").unwrap();
    let index = merge_store_manifests(&[path]).unwrap();
    assert!(index.is_some_and(|i| i.is_empty()));
}

#[test]
fn undecomposable_skip_entries_are_not_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut request = GenerateRequest::load(write_request(dir.path(), "")).unwrap();
    request.skip = vec![SkipEntry {
        item_path: "a.dll".to_owned(),
        conflict_item_type: ConflictItemType::Reference,
    }];
    let closure = ResolvedClosure::read_from_file(&request.closure).unwrap();
    let with_skip = assemble(&request, &closure).unwrap();
    request.skip.clear();
    let without_skip = assemble(&request, &closure).unwrap();
    assert_eq!(with_skip, without_skip);
}
