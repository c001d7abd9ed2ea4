//! Order migrations and compute the manifest diff of a validated record set.

use std::collections::BTreeMap;

use version_util::compare;

use crate::entity::{MigrationStep, PackageRecord, UpdatePlan, VersionChange};

/// Build the plan of a validated record set.
///
/// Every moving package lands in the manifest diff. Moving packages whose
/// target declares migrations get one step each, ordered by target version
/// and then by name, so lower targets of any package migrate first.
pub fn plan(records: &BTreeMap<String, PackageRecord>) -> UpdatePlan {
    let mut manifest_diff = BTreeMap::new();
    let mut migrations = Vec::new();

    for record in records.values() {
        let Some(target) = &record.target else {
            continue;
        };
        manifest_diff.insert(
            record.name.clone(),
            VersionChange {
                old: record.installed.version.clone(),
                new: target.version.clone(),
            },
        );
        if let Some(collection) = &target.manifest.update_metadata.migrations {
            migrations.push(MigrationStep::new(
                &record.name,
                collection,
                record.installed.version.clone(),
                target.version.clone(),
            ));
        }
    }

    migrations.sort_by(|a, b| {
        compare(&a.to_version, &b.to_version).then_with(|| a.package_name.cmp(&b.package_name))
    });

    UpdatePlan {
        manifest_diff,
        migrations,
    }
}

#[cfg(test)]
mod tests {
    use npm_registry::VersionManifest;
    use serde_json::{json, Value};

    use super::*;
    use crate::entity::ResolvedVersion;
    use crate::usecase::fixture::v;

    fn resolved(name: &str, version: &str, manifest: Value) -> ResolvedVersion {
        ResolvedVersion::new(v(version), VersionManifest::from_value(name, v(version), &manifest))
    }

    fn moving(name: &str, from: &str, to: &str, migrations: Option<&str>) -> PackageRecord {
        let manifest = match migrations {
            Some(migrations) => json!({ "ng-update": { "migrations": migrations } }),
            None => json!({}),
        };
        PackageRecord::new(
            name,
            "*",
            resolved(name, from, json!({})),
            Some(resolved(name, to, manifest)),
        )
    }

    fn records(list: Vec<PackageRecord>) -> BTreeMap<String, PackageRecord> {
        list.into_iter().map(|r| (r.name.clone(), r)).collect()
    }

    #[test]
    fn test_order_by_target_then_name() {
        let plan = plan(&records(vec![
            moving("c", "1.0.0", "2.0.0", Some("./migrations.json")),
            moving("b", "1.0.0", "1.5.0", Some("./migrations.json")),
            moving("a", "1.0.0", "1.5.0", Some("./migrations.json")),
        ]));

        let order: Vec<_> = plan
            .migrations
            .iter()
            .map(|s| format!("{}@{}", s.package_name, s.to_version))
            .collect();
        assert_eq!(order, vec!["a@1.5.0", "b@1.5.0", "c@2.0.0"]);
    }

    #[test]
    fn test_prerelease_target_sorts_first() {
        let plan = plan(&records(vec![
            moving("a", "1.0.0", "2.0.0", Some("m")),
            moving("z", "1.0.0", "2.0.0-rc.1", Some("m")),
        ]));
        assert_eq!(plan.migrations[0].package_name, "z");
    }

    #[test]
    fn test_left_pad_scenario() {
        let plan = plan(&records(vec![moving("left-pad", "1.0.0", "1.3.0", None)]));

        assert!(plan.migrations.is_empty());
        assert_eq!(
            plan.manifest_diff,
            BTreeMap::from([(
                "left-pad".to_string(),
                VersionChange {
                    old: v("1.0.0"),
                    new: v("1.3.0")
                }
            )])
        );
    }

    #[test]
    fn test_steps_carry_versions_and_collection() {
        let mut list = vec![moving("@angular/core", "6.1.0", "7.0.0", Some("./migrations/collection.json"))];
        list.push(PackageRecord::new(
            "rxjs",
            "^6.0.0",
            resolved("rxjs", "6.3.0", json!({ "ng-update": { "migrations": "./m.json" } })),
            None,
        ));
        let plan = plan(&records(list));

        assert_eq!(plan.manifest_diff.len(), 1);
        assert_eq!(
            plan.migrations,
            vec![MigrationStep {
                package_name: "@angular/core".to_string(),
                migration_collection_ref: "@angular/core/./migrations/collection.json".to_string(),
                from_version: v("6.1.0"),
                to_version: v("7.0.0"),
            }]
        );
    }
}
