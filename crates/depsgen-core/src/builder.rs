use crate::merger::FilteredPackageIndex;
use crate::CoreError;
use depsgen_schema::{
    AssetGroup, ClosureLibrary, CompilationOptions, CompileLibrary, DepsManifest, FoldedKey,
    LibraryType, ProjectInfo, ProjectReferenceInfo, ReferenceInfo, ResolvedClosure,
    ResourceAssembly, RuntimeLibrary, SatelliteFile, Target,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// Assembles a [`DepsManifest`] from the resolved closure and the project's
/// reference metadata.
///
/// The output is a pure function of the inputs: library order follows the
/// closure, with the main project first and direct and framework references
/// last.
pub struct ManifestBuilder<'a> {
    project: &'a ProjectInfo,
    closure: &'a ResolvedClosure,
    framework_references: &'a [ReferenceInfo],
    direct_references: &'a [ReferenceInfo],
    project_references: &'a [ProjectReferenceInfo],
    private_assets: &'a [String],
    compilation_options: CompilationOptions,
    reference_assemblies_path: Option<&'a str>,
    filtered_packages: Option<&'a FilteredPackageIndex>,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(project: &'a ProjectInfo, closure: &'a ResolvedClosure) -> Self {
        Self {
            project,
            closure,
            framework_references: &[],
            direct_references: &[],
            project_references: &[],
            private_assets: &[],
            compilation_options: CompilationOptions::default(),
            reference_assemblies_path: None,
            filtered_packages: None,
        }
    }

    #[must_use]
    pub fn with_framework_references(mut self, refs: &'a [ReferenceInfo]) -> Self {
        self.framework_references = refs;
        self
    }

    #[must_use]
    pub fn with_direct_references(mut self, refs: &'a [ReferenceInfo]) -> Self {
        self.direct_references = refs;
        self
    }

    #[must_use]
    pub fn with_project_references(mut self, refs: &'a [ProjectReferenceInfo]) -> Self {
        self.project_references = refs;
        self
    }

    #[must_use]
    pub fn with_private_assets(mut self, package_ids: &'a [String]) -> Self {
        self.private_assets = package_ids;
        self
    }

    #[must_use]
    pub fn with_compilation_options(mut self, options: CompilationOptions) -> Self {
        self.compilation_options = options;
        self
    }

    #[must_use]
    pub fn with_reference_assemblies_path(mut self, path: Option<&'a str>) -> Self {
        self.reference_assemblies_path = path;
        self
    }

    #[must_use]
    pub fn with_filtered_packages(mut self, index: Option<&'a FilteredPackageIndex>) -> Self {
        self.filtered_packages = index;
        self
    }

    pub fn build(self) -> Result<DepsManifest, CoreError> {
        let framework = self.closure.framework()?;
        let runtime = self.closure.target.runtime_identifier.clone();
        let target = Target {
            framework: framework.to_string(),
            is_portable: runtime.is_none(),
            runtime,
        };
        info!("assembling deps manifest for {}", target.name());

        let graph = ClosureGraph::new(self.closure);
        let compile_excluded = graph.private_asset_exclusions(self.private_assets);
        let runtime_excluded = self.platform_exclusions(&graph);

        let mut compile_libraries = Vec::with_capacity(self.closure.libraries.len() + 1);
        let mut runtime_libraries = Vec::with_capacity(self.closure.libraries.len() + 1);

        let (project_compile, project_runtime) =
            self.main_project_entries(&graph, &compile_excluded, &runtime_excluded);
        compile_libraries.push(project_compile);
        runtime_libraries.push(project_runtime);

        for lib in &self.closure.libraries {
            let key = FoldedKey::new(&lib.name);
            if compile_excluded.contains(&key) {
                debug!("{}: private assets, omitted from compile libraries", lib.name);
            } else {
                compile_libraries.push(compile_entry(lib, &compile_excluded));
            }
            if runtime_excluded.contains(&key) {
                debug!("{}: provided by the platform, omitted from runtime libraries", lib.name);
            } else {
                runtime_libraries.push(self.runtime_entry(lib, &runtime_excluded));
            }
        }

        // Reference names already emitted, so no name appears twice.
        let mut taken = HashSet::new();
        for reference in self.direct_references {
            if graph.contains(&reference.name) {
                debug!("{}: direct reference shadowed by closure library", reference.name);
                continue;
            }
            if !taken.insert(FoldedKey::new(&reference.name)) {
                debug!("{}: duplicate direct reference skipped", reference.name);
                continue;
            }
            let (compile, runtime) = direct_reference_entries(reference);
            compile_libraries.push(compile);
            runtime_libraries.push(runtime);
        }

        for reference in self.framework_references {
            if graph.contains(&reference.name) {
                debug!("{}: framework reference shadowed by closure library", reference.name);
                continue;
            }
            if !taken.insert(FoldedKey::new(&reference.name)) {
                debug!("{}: framework reference shadowed by direct reference", reference.name);
                continue;
            }
            compile_libraries.push(self.framework_reference_entry(reference));
        }

        info!(
            "assembled {} compile and {} runtime libraries",
            compile_libraries.len(),
            runtime_libraries.len()
        );

        Ok(DepsManifest {
            target,
            compilation_options: self.compilation_options,
            compile_libraries,
            runtime_libraries,
            runtime_graph: self.closure.runtime_graph.clone(),
        })
    }

    fn platform_exclusions(&self, graph: &ClosureGraph<'_>) -> HashSet<FoldedKey> {
        let target = &self.closure.target;
        match &target.platform_library {
            Some(platform) if !target.self_contained && graph.contains(platform) => {
                graph.reachable_from([FoldedKey::new(platform)], &HashSet::new())
            }
            _ => HashSet::new(),
        }
    }

    fn main_project_entries(
        &self,
        graph: &ClosureGraph<'_>,
        compile_excluded: &HashSet<FoldedKey>,
        runtime_excluded: &HashSet<FoldedKey>,
    ) -> (CompileLibrary, RuntimeLibrary) {
        let mut compile_deps = BTreeMap::new();
        let mut runtime_deps = BTreeMap::new();

        for name in &self.closure.direct_dependencies {
            let Some(lib) = graph.get(name) else {
                debug!("direct dependency {name} is not in the resolved closure");
                continue;
            };
            let key = FoldedKey::new(&lib.name);
            if !compile_excluded.contains(&key) {
                compile_deps.insert(lib.name.clone(), lib.version.clone());
            }
            if !runtime_excluded.contains(&key) {
                runtime_deps.insert(lib.name.clone(), lib.version.clone());
            }
        }
        for reference in self.direct_references {
            let version = reference.version.clone().unwrap_or_default();
            compile_deps
                .entry(reference.name.clone())
                .or_insert_with(|| version.clone());
            runtime_deps.entry(reference.name.clone()).or_insert(version);
        }
        for reference in self.framework_references {
            compile_deps
                .entry(reference.name.clone())
                .or_insert_with(|| reference.version.clone().unwrap_or_default());
        }

        let output = self.project.output_name();
        let compile = CompileLibrary {
            library_type: LibraryType::Project,
            name: self.project.assembly_name.clone(),
            version: self.project.version.clone(),
            hash: None,
            assemblies: vec![output.clone()],
            dependencies: compile_deps,
            serviceable: false,
            path: None,
            hash_path: None,
        };
        let runtime = RuntimeLibrary {
            library_type: LibraryType::Project,
            name: self.project.assembly_name.clone(),
            version: self.project.version.clone(),
            hash: None,
            runtime_assembly_groups: vec![AssetGroup::portable(vec![output])],
            native_library_groups: Vec::new(),
            resource_assemblies: satellites(&self.project.resource_assemblies),
            dependencies: runtime_deps,
            serviceable: false,
            path: None,
            hash_path: None,
            runtime_store_manifest_name: None,
        };
        (compile, runtime)
    }

    fn runtime_entry(
        &self,
        lib: &ClosureLibrary,
        runtime_excluded: &HashSet<FoldedKey>,
    ) -> RuntimeLibrary {
        let resource_assemblies = if lib.library_type == LibraryType::Project {
            self.project_reference_for(lib).map_or_else(
                || lib.resource_assemblies.clone(),
                |info| satellites(&info.resource_assemblies),
            )
        } else {
            lib.resource_assemblies.clone()
        };

        let runtime_store_manifest_name = match (lib.library_type, self.filtered_packages) {
            (LibraryType::Package, Some(index)) => index.label(&lib.name, &lib.version),
            _ => None,
        };

        RuntimeLibrary {
            library_type: lib.library_type,
            name: lib.name.clone(),
            version: lib.version.clone(),
            hash: lib.sha512.clone(),
            runtime_assembly_groups: lib.runtime_assets.clone(),
            native_library_groups: lib.native_assets.clone(),
            resource_assemblies,
            dependencies: filter_dependencies(&lib.dependencies, runtime_excluded),
            serviceable: lib.serviceable,
            path: lib.path.clone(),
            hash_path: lib.hash_path.clone(),
            runtime_store_manifest_name,
        }
    }

    fn project_reference_for(&self, lib: &ClosureLibrary) -> Option<&'a ProjectReferenceInfo> {
        let name = FoldedKey::new(&lib.name);
        let project_path = lib
            .msbuild_project
            .as_deref()
            .map(|p| FoldedKey::new(&p.replace('\\', "/")));
        self.project_references.iter().find(|info| {
            FoldedKey::new(&info.name) == name
                || project_path.as_ref().is_some_and(|p| {
                    FoldedKey::new(&info.project_path.replace('\\', "/")) == *p
                })
        })
    }

    fn framework_reference_entry(&self, reference: &ReferenceInfo) -> CompileLibrary {
        CompileLibrary {
            library_type: LibraryType::ReferenceAssembly,
            name: reference.name.clone(),
            version: reference.version.clone().unwrap_or_default(),
            hash: None,
            assemblies: vec![self.reference_assembly_path(reference)],
            dependencies: BTreeMap::new(),
            serviceable: false,
            path: None,
            hash_path: None,
        }
    }

    /// Path relative to the reference assemblies root when the reference
    /// lives under it, bare file name otherwise.
    fn reference_assembly_path(&self, reference: &ReferenceInfo) -> String {
        let path = reference.path.replace('\\', "/");
        if let Some(root) = self.reference_assemblies_path {
            let root = root.replace('\\', "/");
            let root = root.trim_end_matches('/');
            if let Some(rest) = path
                .get(..root.len())
                .filter(|head| !root.is_empty() && head.eq_ignore_ascii_case(root))
                .and_then(|_| path.get(root.len()..))
                .and_then(|tail| tail.strip_prefix('/'))
            {
                return rest.to_owned();
            }
        }
        reference.file_name()
    }
}

fn compile_entry(lib: &ClosureLibrary, compile_excluded: &HashSet<FoldedKey>) -> CompileLibrary {
    CompileLibrary {
        library_type: lib.library_type,
        name: lib.name.clone(),
        version: lib.version.clone(),
        hash: lib.sha512.clone(),
        assemblies: lib.compile_assets.clone(),
        dependencies: filter_dependencies(&lib.dependencies, compile_excluded),
        serviceable: lib.serviceable,
        path: lib.path.clone(),
        hash_path: lib.hash_path.clone(),
    }
}

fn direct_reference_entries(reference: &ReferenceInfo) -> (CompileLibrary, RuntimeLibrary) {
    let file = reference.file_name();
    let version = reference.version.clone().unwrap_or_default();
    let compile = CompileLibrary {
        library_type: LibraryType::Reference,
        name: reference.name.clone(),
        version: version.clone(),
        hash: None,
        assemblies: vec![file.clone()],
        dependencies: BTreeMap::new(),
        serviceable: false,
        path: None,
        hash_path: None,
    };
    let runtime = RuntimeLibrary {
        library_type: LibraryType::Reference,
        name: reference.name.clone(),
        version,
        hash: None,
        runtime_assembly_groups: vec![AssetGroup::portable(vec![file])],
        native_library_groups: Vec::new(),
        resource_assemblies: satellites(&reference.resource_assemblies),
        dependencies: BTreeMap::new(),
        serviceable: false,
        path: None,
        hash_path: None,
        runtime_store_manifest_name: None,
    };
    (compile, runtime)
}

fn satellites(files: &[SatelliteFile]) -> Vec<ResourceAssembly> {
    files.iter().map(SatelliteFile::to_resource_assembly).collect()
}

fn filter_dependencies(
    deps: &BTreeMap<String, String>,
    excluded: &HashSet<FoldedKey>,
) -> BTreeMap<String, String> {
    deps.iter()
        .filter(|(name, _)| !excluded.contains(&FoldedKey::new(name)))
        .map(|(name, version)| (name.clone(), version.clone()))
        .collect()
}

/// Case-insensitive name index over the closure's dependency edges.
struct ClosureGraph<'a> {
    closure: &'a ResolvedClosure,
    by_name: HashMap<FoldedKey, &'a ClosureLibrary>,
}

impl<'a> ClosureGraph<'a> {
    fn new(closure: &'a ResolvedClosure) -> Self {
        let mut by_name = HashMap::with_capacity(closure.libraries.len());
        for lib in &closure.libraries {
            by_name.entry(FoldedKey::new(&lib.name)).or_insert(lib);
        }
        Self { closure, by_name }
    }

    fn get(&self, name: &str) -> Option<&'a ClosureLibrary> {
        self.by_name.get(FoldedKey::new(name).as_str()).copied()
    }

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Libraries reachable from `roots` along dependency edges, never
    /// entering a node in `barrier`.
    fn reachable_from(
        &self,
        roots: impl IntoIterator<Item = FoldedKey>,
        barrier: &HashSet<FoldedKey>,
    ) -> HashSet<FoldedKey> {
        let mut seen = HashSet::new();
        let mut stack: Vec<FoldedKey> = roots.into_iter().collect();
        while let Some(key) = stack.pop() {
            if barrier.contains(&key) || !seen.insert(key.clone()) {
                continue;
            }
            if let Some(lib) = self.by_name.get(&key) {
                stack.extend(lib.dependencies.keys().map(FoldedKey::from));
            }
        }
        seen.retain(|k| self.by_name.contains_key(k));
        seen
    }

    /// Packages to drop from the compile closure: the private-asset packages
    /// themselves plus whatever is reachable only through them.
    ///
    /// Public roots are the non-private direct dependencies and every library
    /// no private package reaches, so whatever a kept library depends on is
    /// kept too.
    fn private_asset_exclusions(&self, private_assets: &[String]) -> HashSet<FoldedKey> {
        let private: HashSet<FoldedKey> = private_assets
            .iter()
            .map(FoldedKey::from)
            .filter(|k| self.by_name.contains_key(k))
            .collect();
        if private.is_empty() {
            return HashSet::new();
        }

        let through_private = self.reachable_from(private.iter().cloned(), &HashSet::new());
        let direct_roots = self
            .closure
            .direct_dependencies
            .iter()
            .map(FoldedKey::from);
        let unreached_roots = self
            .closure
            .libraries
            .iter()
            .map(|lib| FoldedKey::new(&lib.name))
            .filter(|k| !through_private.contains(k));
        let public_roots = direct_roots
            .chain(unreached_roots)
            .filter(|k| !private.contains(k));
        let public = self.reachable_from(public_roots, &private);

        through_private
            .into_iter()
            .filter(|k| private.contains(k) || !public.contains(k))
            .collect()
    }
}
