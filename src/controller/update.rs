use std::path::Path;

use anyhow::Context;
use npm_registry::MetadataGateway;
use package_json::{ManifestError, ManifestStore, NodeModules};
use tracing::{info, instrument};

use crate::config::UpdateOptions;
use crate::entity::UpdatePlan;

use super::planner::{Outcome, Planner};
use super::report::render_outdated;
use super::task_runner::{QueuedTasks, TaskRunner};

/// Plan the run for the project at `root`, then apply it.
#[instrument(skip_all, fields(root = %root.display()))]
pub async fn update(
    root: &Path,
    options: &UpdateOptions,
    gateway: &MetadataGateway,
) -> anyhow::Result<()> {
    let mut store = ManifestStore::open(root)?;
    let node_modules = NodeModules::new(root);

    let outcome = Planner::new(gateway, options)
        .run(&store.read_dependencies(), &node_modules)
        .await?;

    let mut tasks = QueuedTasks::default();
    match outcome {
        Outcome::Outdated(rows) => {
            print!("{}", render_outdated(&rows));
            return Ok(());
        }
        Outcome::MigrateOnly(step) => {
            if options.dry_run {
                println!("{}", serde_json::to_string_pretty(&step)?);
                return Ok(());
            }
            if let Some(step) = step {
                tasks.run_migration(step);
            }
        }
        Outcome::Update(plan) => {
            if options.dry_run {
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }
            apply_plan(&plan, !options.migrate_only, &mut store, &mut tasks)
                .with_context(|| format!("failed to update {}", store.path().display()))?;
        }
    }

    tasks.execute(root, &node_modules, options.skip_install).await
}

/// Write the new versions and schedule the follow-up tasks.
///
/// Without `write_manifest` (migrate-only) the manifest is left alone and
/// nothing is installed. Otherwise an unchanged manifest means no install and
/// no migrations either.
pub fn apply_plan(
    plan: &UpdatePlan,
    write_manifest: bool,
    store: &mut ManifestStore,
    runner: &mut dyn TaskRunner,
) -> Result<(), ManifestError> {
    for (name, change) in &plan.manifest_diff {
        info!(
            "Updating package.json with dependency {} @ {:?} (was {:?})...",
            name,
            change.new.to_string(),
            change.old.to_string()
        );
    }

    if write_manifest {
        let outcome = store.write_resolved_versions(&plan.resolved_versions())?;
        if !outcome.changed {
            return Ok(());
        }
        runner.run_install();
    }

    for step in &plan.migrations {
        runner.run_migration(step.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use semver::Version;
    use serde_json::{json, Value};

    use super::*;
    use crate::entity::{MigrationStep, VersionChange};

    fn plan() -> UpdatePlan {
        UpdatePlan {
            manifest_diff: BTreeMap::from([(
                "@angular/core".to_string(),
                VersionChange {
                    old: Version::new(6, 0, 0),
                    new: Version::new(7, 0, 0),
                },
            )]),
            migrations: vec![MigrationStep::new(
                "@angular/core",
                "./migrations.json",
                Version::new(6, 0, 0),
                Version::new(7, 0, 0),
            )],
        }
    }

    fn project(core: &str) -> (tempfile::TempDir, ManifestStore) {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("package.json"),
            json!({ "name": "app", "dependencies": { "@angular/core": core } }).to_string(),
        )
        .unwrap();
        let store = ManifestStore::open(tmp.path()).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_apply_writes_and_schedules() {
        let (tmp, mut store) = project("^6.0.0");
        let mut tasks = QueuedTasks::default();

        apply_plan(&plan(), true, &mut store, &mut tasks).unwrap();

        assert!(tasks.install);
        assert_eq!(tasks.migrations.len(), 1);
        let written: Value =
            serde_json::from_str(&fs::read_to_string(tmp.path().join("package.json")).unwrap())
                .unwrap();
        assert_eq!(written["dependencies"]["@angular/core"], "7.0.0");
    }

    #[test]
    fn test_unchanged_manifest_schedules_nothing() {
        let (_tmp, mut store) = project("7.0.0");
        let mut tasks = QueuedTasks::default();

        apply_plan(&plan(), true, &mut store, &mut tasks).unwrap();

        assert!(tasks.is_empty());
    }

    #[test]
    fn test_migrate_only_leaves_manifest_alone() {
        let (tmp, mut store) = project("^6.0.0");
        let mut tasks = QueuedTasks::default();

        apply_plan(&plan(), false, &mut store, &mut tasks).unwrap();

        assert!(!tasks.install);
        assert_eq!(tasks.migrations.len(), 1);
        let written = fs::read_to_string(tmp.path().join("package.json")).unwrap();
        assert!(written.contains("^6.0.0"));
    }
}
