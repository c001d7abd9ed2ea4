use std::collections::BTreeMap;

use serde::Serialize;

/// Why a package is part of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CandidateOrigin {
    /// Named on the command line
    Explicit,
    /// Every manifest dependency, `--all`
    All,
    /// Member of another candidate's package group
    Group,
    /// Peer dependency of another candidate
    Peer,
}

/// A package to move and the version spec it should move to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub name: String,
    /// Dist-tag, exact version or range
    pub spec: String,
    pub origin: CandidateOrigin,
}

impl Candidate {
    pub fn new(name: impl Into<String>, spec: impl Into<String>, origin: CandidateOrigin) -> Self {
        Self {
            name: name.into(),
            spec: spec.into(),
            origin,
        }
    }
}

/// Name → candidate. The first entry for a name wins; later inserts never
/// overwrite it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    candidates: BTreeMap<String, Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the name is already a candidate.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        if self.candidates.contains_key(&candidate.name) {
            return false;
        }
        self.candidates.insert(candidate.name.clone(), candidate);
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<Candidate> {
        self.candidates.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Candidate> {
        self.candidates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.candidates.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.candidates.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.values()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_wins() {
        let mut set = CandidateSet::new();
        assert!(set.insert(Candidate::new("rxjs", "latest", CandidateOrigin::Explicit)));
        assert!(!set.insert(Candidate::new("rxjs", "^5.0.0", CandidateOrigin::Peer)));

        let rxjs = set.get("rxjs").unwrap();
        assert_eq!(rxjs.spec, "latest");
        assert_eq!(rxjs.origin, CandidateOrigin::Explicit);
        assert_eq!(set.names().count(), 1);
    }
}
