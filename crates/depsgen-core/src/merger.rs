use depsgen_schema::{PackageIdentity, StoreDescriptor, StoreDescriptorError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Packages declared as already present in a runtime store, each mapped to
/// the names of the descriptor files that declared it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredPackageIndex {
    entries: BTreeMap<PackageIdentity, Vec<String>>,
}

impl FilteredPackageIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str, version: &str) -> bool {
        self.entries
            .contains_key(&PackageIdentity::new(name, version))
    }

    /// Descriptor names that declared the package, joined with `;`.
    pub fn label(&self, name: &str, version: &str) -> Option<String> {
        self.entries
            .get(&PackageIdentity::new(name, version))
            .map(|sources| sources.join(";"))
    }

    /// Entries in identity order with their `;`-joined labels.
    pub fn iter(&self) -> impl Iterator<Item = (&PackageIdentity, String)> {
        self.entries.iter().map(|(id, sources)| (id, sources.join(";")))
    }

    /// A source already in the package's label is not repeated.
    pub(crate) fn record(&mut self, identity: PackageIdentity, source: &str) {
        let sources = self.entries.entry(identity).or_default();
        if !sources.iter().any(|s| s == source) {
            sources.push(source.to_owned());
        }
    }
}

/// Merge runtime store descriptors into a [`FilteredPackageIndex`].
///
/// Returns `Ok(None)` when no descriptors were given, so callers can tell
/// "no store filtering" apart from "filtering matched nothing". A single
/// unreadable or malformed descriptor fails the whole merge.
///
/// Each label is the set of descriptor file names in first-seen order, so
/// the same name given twice is listed once.
pub fn merge_store_manifests(
    paths: &[PathBuf],
) -> Result<Option<FilteredPackageIndex>, StoreDescriptorError> {
    if paths.is_empty() {
        return Ok(None);
    }

    let mut index = FilteredPackageIndex::default();
    for path in paths {
        let descriptor = StoreDescriptor::read_from_file(path)?;
        let source = descriptor_name(path);
        debug!(
            "store descriptor {source}: {} packages",
            descriptor.packages.len()
        );

        for pkg in descriptor.packages {
            index.record(pkg, &source);
        }
    }

    info!(
        "merged {} store descriptors into {} filtered packages",
        paths.len(),
        index.len()
    );
    Ok(Some(index))
}

fn descriptor_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}
