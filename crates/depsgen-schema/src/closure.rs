//! Resolved package closure: the already-resolved set of libraries for one
//! target, as handed over by the package-resolution step.

use crate::library::{AssetGroup, LibraryType, ResourceAssembly};
use crate::manifest::RuntimeFallbacks;
use crate::types::RuntimeIdentifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClosureError {
    #[error("failed to read resolved closure: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse resolved closure: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid target framework '{0}'")]
    InvalidFramework(String),
}

/// Parsed target framework, e.g. `net6.0` or `.NETCoreApp,Version=v6.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFramework {
    pub identifier: String,
    pub version: String,
}

impl TargetFramework {
    /// Accepts either the long `Identifier,Version=vX.Y` form or a short
    /// moniker (`net6.0`, `netcoreapp3.1`, `netstandard2.0`, `net472`).
    pub fn parse(input: &str) -> Result<Self, ClosureError> {
        let input = input.trim();
        let invalid = || ClosureError::InvalidFramework(input.to_owned());

        if let Some((identifier, rest)) = input.split_once(',') {
            let version = rest
                .trim()
                .strip_prefix("Version=")
                .map(|v| v.trim_start_matches('v'))
                .ok_or_else(invalid)?;
            let identifier = identifier.trim();
            if identifier.is_empty() || !is_version(version) {
                return Err(invalid());
            }
            return Ok(Self {
                identifier: identifier.to_owned(),
                version: version.to_owned(),
            });
        }

        let split = input
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (moniker, raw_version) = input.split_at(split);
        if moniker.is_empty() || !moniker.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        let moniker = moniker.to_ascii_lowercase();

        let (identifier, version) = match moniker.as_str() {
            "netcoreapp" => (".NETCoreApp", raw_version.to_owned()),
            "netstandard" => (".NETStandard", raw_version.to_owned()),
            // net5.0 and later carry a dot; net472 style monikers do not.
            "net" if raw_version.contains('.') => (".NETCoreApp", raw_version.to_owned()),
            "net" => (".NETFramework", dotted(raw_version)),
            _ => return Err(invalid()),
        };
        if !is_version(&version) {
            return Err(invalid());
        }
        Ok(Self {
            identifier: identifier.to_owned(),
            version,
        })
    }
}

impl fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},Version=v{}", self.identifier, self.version)
    }
}

fn is_version(s: &str) -> bool {
    !s.is_empty()
        && s.split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

fn dotted(digits: &str) -> String {
    digits
        .chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(".")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClosureTarget {
    pub framework: String,
    #[serde(default)]
    pub runtime_identifier: Option<RuntimeIdentifier>,
    /// Package providing the shared runtime (e.g. `Microsoft.NETCore.App`).
    #[serde(default)]
    pub platform_library: Option<String>,
    #[serde(default)]
    pub self_contained: bool,
}

/// One resolved library with its per-target assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClosureLibrary {
    pub name: String,
    pub version: String,
    #[serde(rename = "type", default = "default_library_type")]
    pub library_type: LibraryType,
    #[serde(default)]
    pub sha512: Option<String>,
    /// Package directory relative to the package folder, e.g. `packagea/1.0.0`.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub hash_path: Option<String>,
    #[serde(default)]
    pub serviceable: bool,
    /// Project file path for `project` libraries.
    #[serde(default)]
    pub msbuild_project: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub compile_assets: Vec<String>,
    #[serde(default)]
    pub runtime_assets: Vec<AssetGroup>,
    #[serde(default)]
    pub native_assets: Vec<AssetGroup>,
    #[serde(default)]
    pub resource_assemblies: Vec<ResourceAssembly>,
}

fn default_library_type() -> LibraryType {
    LibraryType::Package
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedClosure {
    pub target: ClosureTarget,
    /// Names the project itself depends on, in declaration order.
    #[serde(default)]
    pub direct_dependencies: Vec<String>,
    #[serde(default)]
    pub libraries: Vec<ClosureLibrary>,
    #[serde(default)]
    pub runtime_graph: Vec<RuntimeFallbacks>,
}

impl ResolvedClosure {
    pub fn from_json(input: &str) -> Result<Self, ClosureError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, ClosureError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn framework(&self) -> Result<TargetFramework, ClosureError> {
        TargetFramework::parse(&self.target.framework)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_monikers() {
        let tf = TargetFramework::parse("net6.0").unwrap();
        assert_eq!(tf.to_string(), ".NETCoreApp,Version=v6.0");

        let tf = TargetFramework::parse("netcoreapp3.1").unwrap();
        assert_eq!(tf.identifier, ".NETCoreApp");
        assert_eq!(tf.version, "3.1");

        let tf = TargetFramework::parse("netstandard2.0").unwrap();
        assert_eq!(tf.to_string(), ".NETStandard,Version=v2.0");

        let tf = TargetFramework::parse("net472").unwrap();
        assert_eq!(tf.to_string(), ".NETFramework,Version=v4.7.2");
    }

    #[test]
    fn parses_long_form() {
        let tf = TargetFramework::parse(".NETCoreApp,Version=v8.0").unwrap();
        assert_eq!(tf.identifier, ".NETCoreApp");
        assert_eq!(tf.version, "8.0");
    }

    #[test]
    fn rejects_garbage_frameworks() {
        for bad in ["", "net", "6.0", "foo6.0", "net6..0", ".NETCoreApp,v6.0", "net6.x"] {
            assert!(
                TargetFramework::parse(bad).is_err(),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn parses_closure_json() {
        let closure = ResolvedClosure::from_json(
            r#"{
                "target": {"framework": "net6.0", "runtime_identifier": "linux-x64"},
                "direct_dependencies": ["PackageA"],
                "libraries": [
                    {
                        "name": "PackageA",
                        "version": "1.0.0",
                        "sha512": "sha512-abc",
                        "path": "packagea/1.0.0",
                        "compile_assets": ["lib/net6.0/a.dll"],
                        "runtime_assets": [{"asset_paths": ["lib/net6.0/a.dll"]}]
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(closure.target.runtime_identifier.as_deref(), Some("linux-x64"));
        assert!(!closure.target.self_contained);
        assert_eq!(closure.libraries[0].library_type, LibraryType::Package);
        assert_eq!(closure.libraries[0].runtime_assets[0].runtime, None);
        assert_eq!(closure.framework().unwrap().version, "6.0");
    }

    #[test]
    fn rejects_unknown_closure_fields() {
        let result = ResolvedClosure::from_json(
            r#"{"target": {"framework": "net6.0"}, "mystery": 1}"#,
        );
        assert!(result.is_err());
    }
}
