//! Deps manifest assembly and trimming for depsgen.
//!
//! `merger` folds runtime store descriptors into a filtered-package index,
//! `builder` assembles the manifest from the resolved closure and reference
//! metadata, `trimmer` removes conflict-excluded files, and `pipeline` runs
//! the three in order and writes the result.

pub mod builder;
pub mod merger;
pub mod pipeline;
pub mod trimmer;

pub use builder::ManifestBuilder;
pub use merger::{merge_store_manifests, FilteredPackageIndex};
pub use pipeline::{assemble, generate, GenerateResult};
pub use trimmer::trim;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("closure error: {0}")]
    Closure(#[from] depsgen_schema::ClosureError),
    #[error("store descriptor error: {0}")]
    StoreDescriptor(#[from] depsgen_schema::StoreDescriptorError),
    #[error("output error: {0}")]
    Manifest(#[from] depsgen_schema::ManifestError),
}
