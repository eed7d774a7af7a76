//! The `depsgen.toml` request file: every input of one generation run.

use crate::manifest::CompilationOptions;
use crate::project::{ProjectInfo, ProjectReferenceInfo, ReferenceInfo};
use crate::skip::SkipEntry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to read request file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse request file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateRequest {
    /// Resolved closure JSON.
    pub closure: PathBuf,
    /// Where the deps manifest is written.
    pub output: PathBuf,
    pub project: ProjectInfo,
    #[serde(default)]
    pub reference_assemblies_path: Option<String>,
    /// Package folders used to decompose skip entry paths.
    #[serde(default)]
    pub package_folders: Vec<String>,
    #[serde(default)]
    pub private_assets: Vec<String>,
    /// Descriptors of packages already present in a runtime store.
    #[serde(default)]
    pub store_manifests: Vec<PathBuf>,
    #[serde(default)]
    pub framework_references: Vec<ReferenceInfo>,
    #[serde(default)]
    pub direct_references: Vec<ReferenceInfo>,
    #[serde(default)]
    pub project_references: Vec<ProjectReferenceInfo>,
    #[serde(default)]
    pub skip: Vec<SkipEntry>,
    #[serde(default)]
    pub compilation_options: CompilationOptions,
}

impl GenerateRequest {
    pub fn parse(input: &str) -> Result<Self, RequestError> {
        Ok(toml::from_str(input)?)
    }

    /// Load a request file, resolving `closure`, `output` and
    /// `store_manifests` against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RequestError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let request = Self::parse(&content)?;
        let base = path.parent().unwrap_or(Path::new("."));
        Ok(request.rebased(base))
    }

    #[must_use]
    pub fn rebased(mut self, base: &Path) -> Self {
        self.closure = base.join(&self.closure);
        self.output = base.join(&self.output);
        self.store_manifests = self
            .store_manifests
            .into_iter()
            .map(|p| base.join(p))
            .collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skip::ConflictItemType;

    const SAMPLE: &str = r#"
closure = "obj/closure.json"
output = "bin/App.deps.json"
package_folders = ["/home/u/.nuget/packages"]
private_assets = ["StyleCop.Analyzers"]
store_manifests = ["store/aspnet.toml"]

[project]
path = "App.csproj"
assembly_name = "App"
version = "1.2.0"

[[project.resource_assemblies]]
locale = "fr"
path = "fr/App.resources.dll"

[[direct_references]]
name = "Legacy"
path = "libs/Legacy.dll"

[[skip]]
item_path = "/home/u/.nuget/packages/packagea/1.0.0/lib/net6.0/a.dll"
conflict_item_type = "CopyLocal"

[compilation_options]
defines = ["RELEASE"]
optimize = true
"#;

    #[test]
    fn parses_full_request() {
        let request = GenerateRequest::parse(SAMPLE).unwrap();
        assert_eq!(request.project.assembly_name, "App");
        assert_eq!(request.project.resource_assemblies.len(), 1);
        assert_eq!(request.direct_references[0].name, "Legacy");
        assert_eq!(
            request.skip[0].conflict_item_type,
            ConflictItemType::CopyLocal
        );
        assert_eq!(request.compilation_options.optimize, Some(true));
        assert!(request.framework_references.is_empty());
    }

    #[test]
    fn load_rebases_paths_on_request_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depsgen.toml");
        fs::write(&path, SAMPLE).unwrap();

        let request = GenerateRequest::load(&path).unwrap();
        assert_eq!(request.closure, dir.path().join("obj/closure.json"));
        assert_eq!(request.output, dir.path().join("bin/App.deps.json"));
        assert_eq!(
            request.store_manifests,
            vec![dir.path().join("store/aspnet.toml")]
        );
    }

    #[test]
    fn absolute_paths_survive_rebase() {
        let request = GenerateRequest::parse(SAMPLE)
            .unwrap()
            .rebased(Path::new("/work"));
        let absolute = GenerateRequest {
            closure: PathBuf::from("/abs/closure.json"),
            ..request
        }
        .rebased(Path::new("/elsewhere"));
        assert_eq!(absolute.closure, PathBuf::from("/abs/closure.json"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let input = format!("{SAMPLE}\nunexpected = 1\n");
        assert!(GenerateRequest::parse(&input).is_err());
    }
}
