use thiserror::Error;

use super::PeerViolation;

/// Conditions that abort a planning run.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("package {0:?} was not found in package.json")]
    PackageNotInManifest(String),

    #[error("package {name:?} has no installable version for {range:?}")]
    NoInstallableVersion { name: String, range: String },

    #[error("package {0:?} was not found on the registry, cannot continue as this may be an error")]
    PackageNotFoundOnRegistry(String),

    #[error("invalid version {spec:?} for package {package:?}")]
    InvalidVersionSpec { package: String, spec: String },

    #[error("incompatible peer dependencies found:\n{}", list_violations(.0))]
    PeerValidationFailed(Vec<PeerViolation>),

    #[error("--from requires that only a single package be passed")]
    MigrateOnlyRequiresSinglePackage,
}

fn list_violations(violations: &[PeerViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}
