use std::collections::BTreeMap;

use npm_registry::{Lookup, MetadataGateway, VersionManifest};
use package_json::{DeclaredDependency, NodeModules};
use semver::Version;
use tracing::{debug, info, instrument, warn};

use crate::config::UpdateOptions;
use crate::entity::{CandidateOrigin, CandidateSet, MigrationStep, PlanError, UpdatePlan};
use crate::usecase::{
    build_package_list, build_records, enforce, expand, migrate_only_step, normalize_version,
    outdated, parse_token, plan, require_single_package, validate, Expansion, OutdatedPackage,
    RecordSources, Selection,
};

use super::report::forward;

/// What a planning run decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was requested, these packages could be updated.
    Outdated(Vec<OutdatedPackage>),
    /// Rewrite the manifest and run the ordered migrations.
    Update(UpdatePlan),
    /// Re-run the migrations of one installed package, if it has any.
    MigrateOnly(Option<MigrationStep>),
}

/// Runs the planning pipeline for one project against a metadata gateway.
pub struct Planner<'a> {
    gateway: &'a MetadataGateway,
    options: &'a UpdateOptions,
}

/// `--from`/`--to` of a migrate-only run, normalised.
struct MigrateWindow {
    package: String,
    from: Version,
    to: Option<Version>,
}

impl<'a> Planner<'a> {
    pub fn new(gateway: &'a MetadataGateway, options: &'a UpdateOptions) -> Self {
        Self { gateway, options }
    }

    #[instrument(skip_all)]
    pub async fn run(
        &self,
        manifest: &BTreeMap<String, DeclaredDependency>,
        node_modules: &NodeModules,
    ) -> Result<Outcome, PlanError> {
        let window = self.migrate_window()?;

        let (mut seed, diagnostics) = build_package_list(
            Selection {
                tokens: &self.options.packages,
                all: self.options.all,
                next: self.options.next,
            },
            manifest,
        );
        forward(&diagnostics);

        let mut lookups = self
            .gateway
            .fetch_batch(manifest.keys().chain(seed.names()).cloned())
            .await;
        self.check_requested(&mut seed, manifest, &lookups)?;

        let expansion = self.expand(&seed, manifest, &mut lookups).await;

        let local = local_installs(node_modules, manifest.keys());
        let (records, diagnostics) = build_records(RecordSources {
            candidates: &expansion.candidates,
            manifest,
            lookups: &lookups,
            local: &local,
        })?;
        forward(&diagnostics);

        if expansion.candidates.is_empty() {
            return Ok(Outcome::Outdated(outdated(
                &records,
                &lookups,
                self.options.next,
            )));
        }

        if let Some(window) = window {
            let step = migrate_only_step(records.get(&window.package), &window.from, window.to.as_ref());
            if step.is_none() {
                info!("package {} has no migrations to run", window.package);
            }
            return Ok(Outcome::MigrateOnly(step));
        }

        for record in records.values() {
            if let Some(target) = &record.target {
                debug!(
                    "{} {} => {}",
                    record.name, record.installed.version, target.version
                );
            }
        }
        forward(&enforce(validate(&records), self.options.force)?);

        Ok(Outcome::Update(plan(&records)))
    }

    fn migrate_window(&self) -> Result<Option<MigrateWindow>, PlanError> {
        if !self.options.migrate_only {
            return Ok(None);
        }
        let Some(from) = &self.options.from else {
            return Ok(None);
        };
        require_single_package(&self.options.packages)?;

        let raw = &self.options.packages[0];
        let package = parse_token(raw)
            .map(|token| token.name)
            .unwrap_or_else(|| raw.clone());
        let from = normalize_version(&package, from)?;
        let to = self
            .options
            .to
            .as_deref()
            .map(|to| normalize_version(&package, to))
            .transpose()?;

        Ok(Some(MigrateWindow { package, from, to }))
    }

    /// Explicitly named packages must exist. Packages selected by `--all` may
    /// be skipped with `--best-effort`.
    fn check_requested(
        &self,
        seed: &mut CandidateSet,
        manifest: &BTreeMap<String, DeclaredDependency>,
        lookups: &BTreeMap<String, Lookup>,
    ) -> Result<(), PlanError> {
        let missing: Vec<(String, CandidateOrigin)> = seed
            .iter()
            .filter(|c| lookups.get(&c.name).and_then(Lookup::found).is_none())
            .map(|c| (c.name.clone(), c.origin))
            .collect();

        for (name, origin) in missing {
            if origin == CandidateOrigin::Explicit || !self.options.best_effort {
                return Err(PlanError::PackageNotFoundOnRegistry(name));
            }
            warn!("package {name:?} was not found on the registry, skipping");
            seed.remove(&name);
        }

        for name in manifest.keys().filter(|name| !seed.contains(name)) {
            if matches!(lookups.get(name), Some(Lookup::NotFound)) {
                warn!("package {name:?} was not found on the registry, skipping");
            }
        }
        Ok(())
    }

    /// Expand, fetching whatever the expansion discovered, until nothing is
    /// pending.
    async fn expand(
        &self,
        seed: &CandidateSet,
        manifest: &BTreeMap<String, DeclaredDependency>,
        lookups: &mut BTreeMap<String, Lookup>,
    ) -> Expansion {
        loop {
            let expansion = expand(seed, lookups, manifest);
            if expansion.is_complete() {
                return expansion;
            }
            debug!("fetching {} packages found by expansion", expansion.pending.len());
            let fetched = self.gateway.fetch_batch(expansion.pending).await;
            for (name, lookup) in &fetched {
                if matches!(lookup, Lookup::NotFound) {
                    warn!("package {name:?} was not found on the registry, skipping");
                }
            }
            lookups.extend(fetched);
        }
    }
}

fn local_installs<'n, I>(node_modules: &NodeModules, names: I) -> BTreeMap<String, VersionManifest>
where
    I: IntoIterator<Item = &'n String>,
{
    names
        .into_iter()
        .filter_map(|name| {
            let installed = node_modules.installed(name)?;
            let manifest = VersionManifest::from_package_json(&installed.document)?;
            Some((name.clone(), manifest))
        })
        .collect()
}
