//! Data model for depsgen: deps manifests, the resolved package closure,
//! project and reference metadata, conflict skip sets, runtime store
//! descriptors, and the `depsgen.toml` request file.
//!
//! Everything here is plain data plus parsing. The assembly and trimming
//! logic lives in `depsgen-core`.

pub mod closure;
pub mod library;
pub mod manifest;
pub mod project;
pub mod request;
pub mod skip;
pub mod store;
pub mod types;

pub use closure::{
    ClosureError, ClosureLibrary, ClosureTarget, ResolvedClosure, TargetFramework,
};
pub use library::{AssetGroup, CompileLibrary, LibraryType, ResourceAssembly, RuntimeLibrary};
pub use manifest::{CompilationOptions, DepsManifest, ManifestError, RuntimeFallbacks, Target};
pub use project::{ProjectInfo, ProjectReferenceInfo, ReferenceInfo, SatelliteFile};
pub use request::{GenerateRequest, RequestError};
pub use skip::{
    decompose_item_path, ConflictItemType, PackageSubPath, SkipEntry, SkipPaths, SkipSet,
    SkipSets,
};
pub use store::{PackageIdentity, StoreDescriptor, StoreDescriptorError};
pub use types::{FoldedKey, Locale, RuntimeIdentifier};
