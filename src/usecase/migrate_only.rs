//! Re-run the migrations of one installed package between explicit versions.

use semver::Version;
use version_util::coerce_version;

use crate::entity::{MigrationStep, PackageRecord, PlanError};

/// `--from` only makes sense for exactly one package.
pub fn require_single_package(tokens: &[String]) -> Result<(), PlanError> {
    if tokens.len() == 1 {
        Ok(())
    } else {
        Err(PlanError::MigrateOnlyRequiresSinglePackage)
    }
}

/// Normalise a user supplied `--from`/`--to` (`6`, `6.1`, `7-beta`).
pub fn normalize_version(package: &str, raw: &str) -> Result<Version, PlanError> {
    coerce_version(raw).ok_or_else(|| PlanError::InvalidVersionSpec {
        package: package.to_string(),
        spec: raw.to_string(),
    })
}

/// The migration step for the installed version's collection, from `from` to
/// `to` (default: the installed version). No ordering is enforced between the
/// two versions.
pub fn migrate_only_step(
    record: Option<&PackageRecord>,
    from: &Version,
    to: Option<&Version>,
) -> Option<MigrationStep> {
    let record = record?;
    let migrations = record
        .installed
        .manifest
        .update_metadata
        .migrations
        .as_deref()?;
    Some(MigrationStep::new(
        &record.name,
        migrations,
        from.clone(),
        to.unwrap_or(&record.installed.version).clone(),
    ))
}
