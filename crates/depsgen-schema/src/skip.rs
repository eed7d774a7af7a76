//! Files excluded by upstream conflict resolution, grouped per library.

use crate::types::FoldedKey;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Kind of conflict item; `Reference` items are compile-time assets,
/// every other kind is a run-time asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConflictItemType {
    Reference,
    CopyLocal,
    Platform,
    Other(String),
}

impl ConflictItemType {
    pub fn is_compile_time(&self) -> bool {
        matches!(self, ConflictItemType::Reference)
    }
}

impl From<String> for ConflictItemType {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "reference" => ConflictItemType::Reference,
            "copylocal" => ConflictItemType::CopyLocal,
            "platform" => ConflictItemType::Platform,
            _ => ConflictItemType::Other(s),
        }
    }
}

impl From<ConflictItemType> for String {
    fn from(t: ConflictItemType) -> Self {
        match t {
            ConflictItemType::Reference => "Reference".to_owned(),
            ConflictItemType::CopyLocal => "CopyLocal".to_owned(),
            ConflictItemType::Platform => "Platform".to_owned(),
            ConflictItemType::Other(s) => s,
        }
    }
}

/// A file flagged by conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkipEntry {
    pub item_path: String,
    pub conflict_item_type: ConflictItemType,
}

/// Package coordinates recovered from a file path inside a package folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSubPath {
    pub package_id: String,
    pub version: String,
    pub sub_path: String,
}

/// Split `item_path` into package id, version and the path inside the
/// package.
///
/// Paths under one of `package_folders` are taken relative to it; relative
/// paths are read as `<id>/<version>/<sub_path>` directly. Returns `None`
/// when no such decomposition exists.
pub fn decompose_item_path(item_path: &str, package_folders: &[String]) -> Option<PackageSubPath> {
    let normalized = item_path.replace('\\', "/");

    let relative = package_folders
        .iter()
        .find_map(|folder| strip_folder(&normalized, folder))
        .or_else(|| (!is_absolute(&normalized)).then_some(normalized.as_str()))?;

    let mut parts = relative.trim_start_matches('/').splitn(3, '/');
    let package_id = parts.next().filter(|s| !s.is_empty())?;
    let version = parts.next().filter(|s| !s.is_empty())?;
    let sub_path = parts.next().filter(|s| !s.is_empty())?;

    Some(PackageSubPath {
        package_id: package_id.to_owned(),
        version: version.to_owned(),
        sub_path: sub_path.to_owned(),
    })
}

fn strip_folder<'a>(path: &'a str, folder: &str) -> Option<&'a str> {
    let folder = folder.replace('\\', "/");
    let folder = folder.trim_end_matches('/');
    if folder.is_empty() || path.len() <= folder.len() {
        return None;
    }
    let head = path.get(..folder.len())?;
    let tail = path.get(folder.len()..)?;
    if head.eq_ignore_ascii_case(folder) {
        tail.strip_prefix('/')
    } else {
        None
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || path.as_bytes().get(1) == Some(&b':')
}

/// Case-insensitive map from library name to case-insensitive file paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet {
    entries: HashMap<FoldedKey, HashSet<FoldedKey>>,
}

impl SkipSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, library: &str, path: &str) {
        self.entries
            .entry(FoldedKey::new(library))
            .or_default()
            .insert(FoldedKey::new(path));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of libraries with at least one skipped path.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Skipped paths for `library`, if the library is named at all.
    pub fn paths_for(&self, library: &str) -> Option<SkipPaths<'_>> {
        self.entries
            .get(FoldedKey::new(library).as_str())
            .map(|set| SkipPaths { set })
    }

    /// Library keys in sorted order (lowercased).
    pub fn libraries(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(FoldedKey::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for SkipSet {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut set = SkipSet::new();
        for (library, path) in iter {
            set.insert(library, path);
        }
        set
    }
}

/// View over the skipped paths of one library.
#[derive(Debug, Clone, Copy)]
pub struct SkipPaths<'a> {
    set: &'a HashSet<FoldedKey>,
}

impl SkipPaths<'_> {
    pub fn contains(&self, path: &str) -> bool {
        self.set.contains(FoldedKey::new(path).as_str())
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

/// Compile-time and run-time skip sets derived from one skip list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSets {
    pub compile: SkipSet,
    pub runtime: SkipSet,
}

impl SkipSets {
    /// Partition skip entries by conflict item type. Entries whose path does
    /// not decompose into a package id and sub-path are ignored.
    pub fn from_entries(entries: &[SkipEntry], package_folders: &[String]) -> Self {
        let mut sets = SkipSets::default();
        for entry in entries {
            let Some(decomposed) = decompose_item_path(&entry.item_path, package_folders) else {
                debug!("ignoring skip entry outside package content: {}", entry.item_path);
                continue;
            };
            let target = if entry.conflict_item_type.is_compile_time() {
                &mut sets.compile
            } else {
                &mut sets.runtime
            };
            target.insert(&decomposed.package_id, &decomposed.sub_path);
        }
        sets
    }

    pub fn is_empty(&self) -> bool {
        self.compile.is_empty() && self.runtime.is_empty()
    }
}
