use crate::library::ResourceAssembly;
use crate::types::Locale;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A satellite resource file produced by a project or shipped next to a
/// direct reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SatelliteFile {
    pub locale: Locale,
    pub path: String,
}

impl SatelliteFile {
    pub fn to_resource_assembly(&self) -> ResourceAssembly {
        ResourceAssembly {
            path: self.path.replace('\\', "/"),
            locale: self.locale.clone(),
        }
    }
}

/// The project whose deps manifest is being generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectInfo {
    pub path: String,
    pub assembly_name: String,
    #[serde(default = "default_extension")]
    pub assembly_extension: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub resource_assemblies: Vec<SatelliteFile>,
}

fn default_extension() -> String {
    ".dll".to_owned()
}

fn default_version() -> String {
    "1.0.0".to_owned()
}

impl ProjectInfo {
    /// File name of the project's output assembly, e.g. `App.dll`.
    pub fn output_name(&self) -> String {
        let ext = self.assembly_extension.trim_start_matches('.');
        if ext.is_empty() {
            self.assembly_name.clone()
        } else {
            format!("{}.{ext}", self.assembly_name)
        }
    }
}

/// A framework or direct file reference resolved outside package resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub path: String,
    #[serde(default)]
    pub resource_assemblies: Vec<SatelliteFile>,
}

impl ReferenceInfo {
    /// File name component of the reference path.
    pub fn file_name(&self) -> String {
        let normalized = self.path.replace('\\', "/");
        Path::new(&normalized)
            .file_name()
            .map_or_else(|| normalized.clone(), |n| n.to_string_lossy().into_owned())
    }
}

/// Satellite information for a project-to-project reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectReferenceInfo {
    pub project_path: String,
    pub name: String,
    #[serde(default)]
    pub resource_assemblies: Vec<SatelliteFile>,
}
