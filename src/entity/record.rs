use npm_registry::VersionManifest;
use semver::Version;
use version_util::gt;

/// An exact version together with its published manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVersion {
    pub version: Version,
    pub manifest: VersionManifest,
}

impl ResolvedVersion {
    pub fn new(version: Version, manifest: VersionManifest) -> Self {
        Self { version, manifest }
    }
}

/// What is installed for one package and what it would move to.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageRecord {
    pub name: String,
    /// Range declared by the project
    pub manifest_range: String,
    pub installed: ResolvedVersion,
    /// Absent when the package does not move this run
    pub target: Option<ResolvedVersion>,
}

impl PackageRecord {
    /// # Panics
    ///
    /// When `target` is not strictly newer than `installed`; callers drop such
    /// targets before building the record.
    pub fn new(
        name: impl Into<String>,
        manifest_range: impl Into<String>,
        installed: ResolvedVersion,
        target: Option<ResolvedVersion>,
    ) -> Self {
        let name = name.into();
        if let Some(target) = &target {
            assert!(
                gt(&target.version, &installed.version),
                "target {} of {} is not newer than installed {}",
                target.version,
                name,
                installed.version
            );
        }
        Self {
            name,
            manifest_range: manifest_range.into(),
            installed,
            target,
        }
    }

    /// The version present after the run.
    pub fn effective_version(&self) -> &Version {
        self.target
            .as_ref()
            .map_or(&self.installed.version, |t| &t.version)
    }

    /// The manifest present after the run.
    pub fn effective_manifest(&self) -> &VersionManifest {
        self.target
            .as_ref()
            .map_or(&self.installed.manifest, |t| &t.manifest)
    }
}
