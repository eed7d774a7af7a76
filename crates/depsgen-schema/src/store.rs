use crate::types::FoldedKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreDescriptorError {
    #[error("failed to read store descriptor '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse store descriptor '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("store descriptor '{path}' has a package with an empty {field}")]
    EmptyField { path: PathBuf, field: &'static str },
}

/// Package name and version. Names compare case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageIdentity {
    #[serde(rename = "id")]
    pub name: String,
    pub version: String,
}

impl PackageIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    fn key(&self) -> (FoldedKey, FoldedKey) {
        (FoldedKey::new(&self.name), FoldedKey::new(&self.version))
    }
}

impl PartialEq for PackageIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for PackageIdentity {}

impl PartialOrd for PackageIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageIdentity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

impl std::hash::Hash for PackageIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A list of packages already present in a shared runtime store.
///
/// ```toml
/// [[package]]
/// id = "Newtonsoft.Json"
/// version = "13.0.1"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreDescriptor {
    #[serde(default, rename = "package")]
    pub packages: Vec<PackageIdentity>,
}

impl StoreDescriptor {
    pub fn parse(input: &str, path: &Path) -> Result<Self, StoreDescriptorError> {
        let descriptor: StoreDescriptor =
            toml::from_str(input).map_err(|source| StoreDescriptorError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        for pkg in &descriptor.packages {
            let field = if pkg.name.trim().is_empty() {
                "id"
            } else if pkg.version.trim().is_empty() {
                "version"
            } else {
                continue;
            };
            return Err(StoreDescriptorError::EmptyField {
                path: path.to_path_buf(),
                field,
            });
        }
        Ok(descriptor)
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, StoreDescriptorError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| StoreDescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }
}
