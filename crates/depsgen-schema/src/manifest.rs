use crate::library::{CompileLibrary, RuntimeLibrary};
use crate::types::{FoldedKey, RuntimeIdentifier};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("deps manifest I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("deps manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Framework and runtime the manifest was produced for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Long framework name, e.g. `.NETCoreApp,Version=v6.0`.
    pub framework: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeIdentifier>,
    /// True when no runtime identifier was given (portable app).
    pub is_portable: bool,
}

impl Target {
    /// `framework` or `framework/runtime`, the key a host uses to select
    /// the target section.
    pub fn name(&self) -> String {
        match &self.runtime {
            Some(rid) => format!("{}/{rid}", self.framework),
            None => self.framework.clone(),
        }
    }
}

/// Compiler settings carried through to the manifest unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilationOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_unsafe: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings_as_errors: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimize: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_sign: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_sign: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emit_entry_point: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_xml_documentation: Option<bool>,
}

/// Fallback chain for one runtime identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeFallbacks {
    pub runtime: RuntimeIdentifier,
    #[serde(default)]
    pub fallbacks: Vec<RuntimeIdentifier>,
}

/// The deps manifest handed to the encoder.
///
/// Library order is the order of the resolved closure and survives trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepsManifest {
    pub target: Target,
    #[serde(default)]
    pub compilation_options: CompilationOptions,
    #[serde(default)]
    pub compile_libraries: Vec<CompileLibrary>,
    #[serde(default)]
    pub runtime_libraries: Vec<RuntimeLibrary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runtime_graph: Vec<RuntimeFallbacks>,
}

impl DepsManifest {
    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the manifest so that the target path either keeps its previous
    /// content or holds the complete new manifest.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), ManifestError> {
        let path = path.as_ref();
        let mut content = self.to_json()?;
        content.push('\n');
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::io::Write::write_all(&mut tmp, content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| ManifestError::Io(e.error))?;
        // Fsync parent directory so the rename survives power loss.
        if let Ok(f) = fs::File::open(dir) {
            let _ = f.sync_all();
        }
        Ok(())
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn compile_library(&self, name: &str) -> Option<&CompileLibrary> {
        let key = FoldedKey::new(name);
        self.compile_libraries
            .iter()
            .find(|l| FoldedKey::new(&l.name) == key)
    }

    pub fn runtime_library(&self, name: &str) -> Option<&RuntimeLibrary> {
        let key = FoldedKey::new(name);
        self.runtime_libraries
            .iter()
            .find(|l| FoldedKey::new(&l.name) == key)
    }
}
