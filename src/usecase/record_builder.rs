//! Combine manifest ranges, installed versions and requested targets into
//! package records.

use std::collections::{BTreeMap, BTreeSet};

use npm_registry::{Lookup, PackageMetadata, VersionManifest};
use package_json::DeclaredDependency;
use version_util::{gt, RangeError};

use crate::entity::{
    Candidate, CandidateOrigin, CandidateSet, Diagnostic, PackageRecord, PlanError,
    ResolvedVersion,
};

/// Everything the builder reads.
#[derive(Debug, Clone, Copy)]
pub struct RecordSources<'a> {
    pub candidates: &'a CandidateSet,
    pub manifest: &'a BTreeMap<String, DeclaredDependency>,
    pub lookups: &'a BTreeMap<String, Lookup>,
    /// Manifests of packages installed under `node_modules`
    pub local: &'a BTreeMap<String, VersionManifest>,
}

/// Build one record per manifest dependency and per candidate.
///
/// Dependencies that are not candidates only provide context for peer
/// validation: when they cannot be resolved they are left out with a warning.
/// Candidates fail the run instead. Peer candidates the project does not
/// declare get no record; validation reports them as missing.
pub fn build_records(
    sources: RecordSources<'_>,
) -> Result<(BTreeMap<String, PackageRecord>, Vec<Diagnostic>), PlanError> {
    let mut records = BTreeMap::new();
    let mut diagnostics = Vec::new();

    let names: BTreeSet<&String> = sources
        .manifest
        .keys()
        .chain(sources.candidates.names())
        .collect();

    for name in names {
        let candidate = sources.candidates.get(name);
        let Some(declared) = sources.manifest.get(name) else {
            match candidate {
                Some(c) if c.origin == CandidateOrigin::Peer => {
                    diagnostics.push(
                        Diagnostic::debug(format!("peer {name} is not declared in package.json"))
                            .package(name),
                    );
                    continue;
                }
                _ => return Err(PlanError::PackageNotInManifest(name.clone())),
            }
        };

        let metadata = sources.lookups.get(name).and_then(Lookup::found);
        let local = sources.local.get(name);
        if metadata.is_none() && local.is_none() {
            diagnostics.push(
                Diagnostic::debug(format!("no registry metadata and no local install for {name}"))
                    .package(name),
            );
            continue;
        }

        match build_record(
            name,
            &declared.range,
            candidate,
            metadata.map(|m| m.as_ref()),
            local,
            &mut diagnostics,
        ) {
            Ok(record) => {
                records.insert(name.clone(), record);
            }
            Err(PlanError::NoInstallableVersion { range, .. }) if candidate.is_none() => {
                diagnostics.push(
                    Diagnostic::warn(format!(
                        "cannot resolve an installed version of {name} for {range:?}, ignoring"
                    ))
                    .package(name),
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok((records, diagnostics))
}

/// Build the record of one package.
///
/// The installed version is the local one when known, else the newest
/// published version satisfying `manifest_range`. The target is the
/// candidate's spec resolved as a dist-tag, else as a range, and is dropped
/// when it is not newer than the installed version.
pub fn build_record(
    name: &str,
    manifest_range: &str,
    candidate: Option<&Candidate>,
    metadata: Option<&PackageMetadata>,
    local: Option<&VersionManifest>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<PackageRecord, PlanError> {
    let installed = resolve_installed(name, manifest_range, metadata, local)?;
    report_malformed(&installed.manifest, diagnostics);

    let target = match (candidate, metadata) {
        (Some(candidate), Some(metadata)) => {
            resolve_target(candidate, metadata, &installed, manifest_range, diagnostics)?
        }
        _ => None,
    };
    if let Some(target) = &target {
        report_malformed(&target.manifest, diagnostics);
    }

    Ok(PackageRecord::new(name, manifest_range, installed, target))
}

fn resolve_installed(
    name: &str,
    manifest_range: &str,
    metadata: Option<&PackageMetadata>,
    local: Option<&VersionManifest>,
) -> Result<ResolvedVersion, PlanError> {
    let no_version = || PlanError::NoInstallableVersion {
        name: name.to_string(),
        range: manifest_range.to_string(),
    };

    let version = match local {
        Some(local) => local.version.clone(),
        None => metadata
            .and_then(|m| m.resolve_spec(manifest_range).ok().flatten())
            .cloned()
            .ok_or_else(no_version)?,
    };
    // the registry copy is authoritative, the local one covers unpublished versions
    let manifest = metadata
        .and_then(|m| m.manifest(&version))
        .or(local)
        .cloned()
        .ok_or_else(no_version)?;

    Ok(ResolvedVersion::new(version, manifest))
}

fn resolve_target(
    candidate: &Candidate,
    metadata: &PackageMetadata,
    installed: &ResolvedVersion,
    manifest_range: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Option<ResolvedVersion>, PlanError> {
    let name = &candidate.name;
    let resolved = match metadata.resolve_spec(&candidate.spec) {
        Ok(resolved) => resolved,
        // a dist-tag the package never published, e.g. the default `next`
        Err(RangeError::Tag(tag)) => {
            diagnostics.push(
                Diagnostic::warn(format!("{name} has no dist-tag {tag:?}, leaving it alone"))
                    .package(name),
            );
            return Ok(None);
        }
        Err(RangeError::Invalid { .. }) if candidate.origin == CandidateOrigin::Explicit => {
            return Err(PlanError::InvalidVersionSpec {
                package: name.clone(),
                spec: candidate.spec.clone(),
            })
        }
        Err(e) => {
            diagnostics.push(
                Diagnostic::warn(format!("cannot resolve {:?} for {name}: {e}", candidate.spec))
                    .package(name),
            );
            return Ok(None);
        }
    };

    let Some(version) = resolved else {
        diagnostics.push(
            Diagnostic::debug(format!("no version of {name} satisfies {:?}", candidate.spec))
                .package(name),
        );
        return Ok(None);
    };
    if !gt(version, &installed.version) {
        diagnostics.push(
            Diagnostic::debug(format!(
                "Package {name} already satisfied by package.json ({manifest_range})"
            ))
            .package(name),
        );
        return Ok(None);
    }

    Ok(metadata
        .manifest(version)
        .map(|manifest| ResolvedVersion::new(version.clone(), manifest.clone())))
}

fn report_malformed(manifest: &VersionManifest, diagnostics: &mut Vec<Diagnostic>) {
    for field in &manifest.malformed {
        diagnostics.push(
            Diagnostic::warn(format!(
                "{} metadata of package {}@{} is malformed, ignoring: {}",
                field.field, manifest.name, manifest.version, field.raw
            ))
            .package(&manifest.name),
        );
    }
}
