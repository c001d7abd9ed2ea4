//! Grow the candidate set through package groups and peer dependencies.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use npm_registry::{Lookup, PackageMetadata, VersionManifest};
use package_json::DeclaredDependency;

use crate::entity::{Candidate, CandidateOrigin, CandidateSet};

/// Result of one expansion over the metadata known so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub candidates: CandidateSet,
    /// Candidates whose metadata has not been fetched yet. Fetch these and
    /// expand again until it is empty.
    pub pending: BTreeSet<String>,
}

impl Expansion {
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Expand `seed` to a fixed point over `lookups`.
///
/// Works through a queue of candidates: each one with metadata resolves its
/// own requested version, then enqueues the members of that version's package
/// group (only those the project depends on, all inheriting the same spec)
/// and its peer dependencies (with the declared peer range as spec). Names
/// already in the set are never overwritten. The result depends only on the
/// inputs, not on the order lookups completed in.
pub fn expand(
    seed: &CandidateSet,
    lookups: &BTreeMap<String, Lookup>,
    manifest: &BTreeMap<String, DeclaredDependency>,
) -> Expansion {
    let mut candidates = seed.clone();
    let mut queue: VecDeque<String> = seed.names().cloned().collect();
    let mut pending = BTreeSet::new();

    while let Some(name) = queue.pop_front() {
        let Some(candidate) = candidates.get(&name).cloned() else {
            continue;
        };
        let metadata = match lookups.get(&name) {
            Some(Lookup::Found(metadata)) => metadata,
            Some(Lookup::NotFound) => continue,
            None => {
                pending.insert(name);
                continue;
            }
        };
        let Some(target) = requested_manifest(metadata, &candidate.spec) else {
            continue;
        };

        for member in &target.update_metadata.package_group {
            // a member the project does not depend on cannot be updated
            if !manifest.contains_key(member) {
                continue;
            }
            let inherited = Candidate::new(member, &candidate.spec, CandidateOrigin::Group);
            if candidates.insert(inherited) {
                queue.push_back(member.clone());
            }
        }

        for (peer, range) in &target.peer_dependencies {
            if candidates.insert(Candidate::new(peer, range, CandidateOrigin::Peer)) {
                queue.push_back(peer.clone());
            }
        }
    }

    Expansion {
        candidates,
        pending,
    }
}

fn requested_manifest<'m>(metadata: &'m PackageMetadata, spec: &str) -> Option<&'m VersionManifest> {
    let version = metadata.resolve_spec(spec).ok().flatten()?;
    metadata.manifest(version)
}
