use std::path::Path;

use anyhow::{bail, Context};
use package_json::NodeModules;
use serde::Serialize;
use tokio::process::Command;
use tracing::{info, warn};

use crate::entity::MigrationStep;
use crate::usecase::schedule;

/// Receives the follow-up work of an applied plan.
pub trait TaskRunner {
    /// Install dependencies after the manifest changed.
    fn run_install(&mut self);

    /// Run one migration collection, in the order received.
    fn run_migration(&mut self, step: MigrationStep);
}

/// Tasks recorded for execution once planning is over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueuedTasks {
    pub install: bool,
    pub migrations: Vec<MigrationStep>,
}

impl TaskRunner for QueuedTasks {
    fn run_install(&mut self) {
        self.install = true;
    }

    fn run_migration(&mut self, step: MigrationStep) {
        self.migrations.push(step);
    }
}

impl QueuedTasks {
    pub fn is_empty(&self) -> bool {
        !self.install && self.migrations.is_empty()
    }

    /// Install first, then hand each migration collection over in order.
    pub async fn execute(
        self,
        project_root: &Path,
        node_modules: &NodeModules,
        skip_install: bool,
    ) -> anyhow::Result<()> {
        if self.install {
            if skip_install {
                info!("skipping npm install");
            } else {
                npm_install(project_root).await?;
            }
        }
        for step in &self.migrations {
            report_migration(step, node_modules)?;
        }
        Ok(())
    }
}

async fn npm_install(project_root: &Path) -> anyhow::Result<()> {
    info!("running npm install in {}", project_root.display());
    let status = Command::new("npm")
        .arg("install")
        .current_dir(project_root)
        .status()
        .await
        .context("failed to spawn npm")?;
    if !status.success() {
        bail!("npm install failed: {status}");
    }
    Ok(())
}

fn report_migration(step: &MigrationStep, node_modules: &NodeModules) -> anyhow::Result<()> {
    info!(
        "** Executing migrations for package '{}' ({} -> {}) **",
        step.package_name, step.from_version, step.to_version
    );
    let Some(path) = step.package_relative_path() else {
        info!(
            "collection {} is not shipped inside {}",
            step.migration_collection_ref, step.package_name
        );
        return Ok(());
    };

    let collection = match node_modules.read_package_file(&step.package_name, path) {
        Ok(collection) => collection,
        Err(e) => {
            warn!("cannot read {}: {}", step.migration_collection_ref, e);
            return Ok(());
        }
    };
    let due = schedule(&collection, step)?;
    if due.is_empty() {
        info!("no migrations of {} apply", step.migration_collection_ref);
    }
    for migration in due {
        match migration.description {
            Some(description) => info!("  {} ({}): {}", migration.name, migration.version, description),
            None => info!("  {} ({})", migration.name, migration.version),
        }
    }
    Ok(())
}
