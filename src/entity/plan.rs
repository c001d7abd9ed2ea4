use std::collections::BTreeMap;

use semver::Version;
use serde::Serialize;

/// One migration collection to run for a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStep {
    pub package_name: String,
    /// `<package>/<path>` for collections shipped inside the package,
    /// otherwise an external collection name
    pub migration_collection_ref: String,
    pub from_version: Version,
    pub to_version: Version,
}

impl MigrationStep {
    pub fn new(package_name: &str, migrations: &str, from_version: Version, to_version: Version) -> Self {
        Self {
            package_name: package_name.to_string(),
            migration_collection_ref: collection_ref(package_name, migrations),
            from_version,
            to_version,
        }
    }

    /// Path of the collection inside its package, when it ships there.
    pub fn package_relative_path(&self) -> Option<&str> {
        self.migration_collection_ref
            .strip_prefix(self.package_name.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|path| path.starts_with(['.', '/']))
    }
}

/// Namespace a package relative migrations path under its package.
pub fn collection_ref(package_name: &str, migrations: &str) -> String {
    if migrations.starts_with(['.', '/']) {
        format!("{package_name}/{migrations}")
    } else {
        migrations.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionChange {
    pub old: Version,
    pub new: Version,
}

/// Everything a run decided: the manifest rewrite and the ordered migrations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlan {
    pub manifest_diff: BTreeMap<String, VersionChange>,
    pub migrations: Vec<MigrationStep>,
}

impl UpdatePlan {
    /// Name → new exact version, the shape the manifest store writes.
    pub fn resolved_versions(&self) -> BTreeMap<String, Version> {
        self.manifest_diff
            .iter()
            .map(|(name, change)| (name.clone(), change.new.clone()))
            .collect()
    }
}
