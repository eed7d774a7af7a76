use crate::types::{Locale, RuntimeIdentifier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Origin of a library entry in the deps manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryType {
    Package,
    Project,
    Reference,
    #[serde(rename = "referenceassembly")]
    ReferenceAssembly,
}

impl fmt::Display for LibraryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LibraryType::Package => "package",
            LibraryType::Project => "project",
            LibraryType::Reference => "reference",
            LibraryType::ReferenceAssembly => "referenceassembly",
        };
        f.write_str(s)
    }
}

/// A locale-specific satellite file belonging to a library or project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAssembly {
    pub path: String,
    pub locale: Locale,
}

impl ResourceAssembly {
    pub fn new(path: impl Into<String>, locale: impl Into<Locale>) -> Self {
        Self {
            path: path.into(),
            locale: locale.into(),
        }
    }
}

/// Asset paths of a runtime library for one runtime identifier.
///
/// `runtime == None` is the platform-agnostic default group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssetGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeIdentifier>,
    #[serde(default)]
    pub asset_paths: Vec<String>,
}

impl AssetGroup {
    pub fn portable(asset_paths: Vec<String>) -> Self {
        Self {
            runtime: None,
            asset_paths,
        }
    }

    pub fn for_runtime(runtime: impl Into<RuntimeIdentifier>, asset_paths: Vec<String>) -> Self {
        Self {
            runtime: Some(runtime.into()),
            asset_paths,
        }
    }
}

/// A library needed at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileLibrary {
    #[serde(rename = "type")]
    pub library_type: LibraryType,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default)]
    pub assemblies: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub serviceable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_path: Option<String>,
}

/// A library needed at run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeLibrary {
    #[serde(rename = "type")]
    pub library_type: LibraryType,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default)]
    pub runtime_assembly_groups: Vec<AssetGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub native_library_groups: Vec<AssetGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_assemblies: Vec<ResourceAssembly>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub serviceable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_path: Option<String>,
    /// `;`-separated names of the store descriptors that declared this
    /// package as already present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_store_manifest_name: Option<String>,
}

impl RuntimeLibrary {
    /// Every asset path across managed and native groups, in group order.
    pub fn all_asset_paths(&self) -> impl Iterator<Item = &str> {
        self.runtime_assembly_groups
            .iter()
            .chain(&self.native_library_groups)
            .flat_map(|g| g.asset_paths.iter().map(String::as_str))
    }
}
