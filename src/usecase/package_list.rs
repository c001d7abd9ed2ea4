//! Seed the candidate set from command line tokens or `--all`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use package_json::{is_custom_version, DeclaredDependency};
use regex::Regex;

use crate::entity::{Candidate, CandidateOrigin, CandidateSet, Diagnostic};

static PACKAGE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:@[^/]{1,100}/)?[^@]{1,100})(?:@(.{1,100}))?$").expect("valid regex")
});

/// `name`, `@scope/name`, optionally followed by `@spec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageToken {
    pub name: String,
    pub spec: Option<String>,
}

pub fn parse_token(token: &str) -> Option<PackageToken> {
    let captures = PACKAGE_TOKEN.captures(token)?;
    Some(PackageToken {
        name: captures.get(1)?.as_str().to_string(),
        spec: captures.get(2).map(|m| m.as_str().to_string()),
    })
}

/// Which packages the user asked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection<'a> {
    pub tokens: &'a [String],
    pub all: bool,
    pub next: bool,
}

/// Build the seed candidates. Tokens win over `all`; with neither the set is
/// empty.
pub fn build_package_list(
    selection: Selection<'_>,
    manifest: &BTreeMap<String, DeclaredDependency>,
) -> (CandidateSet, Vec<Diagnostic>) {
    let mut candidates = CandidateSet::new();
    let mut diagnostics = Vec::new();
    let default_spec = if selection.next { "next" } else { "latest" };

    let (requested, origin): (Vec<String>, _) = if !selection.tokens.is_empty() {
        (selection.tokens.to_vec(), CandidateOrigin::Explicit)
    } else if selection.all {
        (manifest.keys().cloned().collect(), CandidateOrigin::All)
    } else {
        return (candidates, diagnostics);
    };

    for raw in &requested {
        let Some(token) = parse_token(raw) else {
            diagnostics.push(Diagnostic::warn(format!(
                "Invalid package argument: {raw:?}. Skipping."
            )));
            continue;
        };
        let Some(declared) = manifest.get(&token.name) else {
            diagnostics.push(
                Diagnostic::warn(format!("Package not installed: {:?}. Skipping.", token.name))
                    .package(&token.name),
            );
            continue;
        };
        // named packages keep their custom source, only `--all` skips them
        if selection.all && is_custom_version(&declared.range) {
            diagnostics.push(
                Diagnostic::warn(format!(
                    "Package {:?} has a custom version: {:?}. Skipping.",
                    token.name, declared.range
                ))
                .package(&token.name),
            );
            continue;
        }
        let spec = token.spec.unwrap_or_else(|| default_spec.to_string());
        candidates.insert(Candidate::new(token.name, spec, origin));
    }

    (candidates, diagnostics)
}
