//! Packages with an update available, shown when nothing was requested.

use std::collections::{BTreeMap, HashMap};

use npm_registry::Lookup;
use semver::Version;
use serde::Serialize;
use version_util::gt;

use crate::entity::PackageRecord;

const COMMAND: &str = env!("CARGO_PKG_NAME");

/// One row of the outdated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutdatedPackage {
    /// Package, or group name for package groups
    pub name: String,
    pub installed: Version,
    pub available: Version,
    /// Command that performs the update
    pub command: String,
}

/// Installed packages whose `latest` (or `next`) release is newer and ships
/// update metadata. Members of a package group collapse into a single row
/// under the group's name.
pub fn outdated(
    records: &BTreeMap<String, PackageRecord>,
    lookups: &BTreeMap<String, Lookup>,
    next: bool,
) -> Vec<OutdatedPackage> {
    let tag = if next { "next" } else { "latest" };
    let mut groups: HashMap<String, String> = HashMap::new();
    let mut rows = Vec::new();

    for record in records.values() {
        let Some(metadata) = lookups.get(&record.name).and_then(Lookup::found) else {
            continue;
        };
        let Some(available) = metadata.dist_tag(tag) else {
            continue;
        };
        let Some(target) = metadata.manifest(available) else {
            continue;
        };
        if !gt(available, &record.installed.version) || !target.declares_update_metadata {
            continue;
        }

        let mut name = record.name.clone();
        if let Some(group_name) = target.update_metadata.group_name() {
            if groups.contains_key(&record.name) {
                continue;
            }
            for member in &target.update_metadata.package_group {
                groups.insert(member.clone(), group_name.to_string());
            }
            groups.insert(group_name.to_string(), group_name.to_string());
            name = group_name.to_string();
        }

        let mut command = format!("{COMMAND} {name}");
        if next {
            command.push_str(" --next");
        }
        rows.push(OutdatedPackage {
            name,
            installed: record.installed.version.clone(),
            available: available.clone(),
            command,
        });
    }

    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}
