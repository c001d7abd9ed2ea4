//! Semver precedence helpers.
//!
//! `semver::Version`'s `Ord` also orders build metadata, which semver
//! precedence ignores. These helpers compare on major, minor, patch and
//! pre-release only.

use std::cmp::Ordering;

use semver::Version;

/// Compare two versions by semver precedence.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| compare_pre(a, b))
}

// a release sorts above any of its pre-releases
fn compare_pre(a: &Version, b: &Version) -> Ordering {
    match (a.pre.is_empty(), b.pre.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.pre.cmp(&b.pre),
    }
}

/// `a <= b` by precedence.
pub fn lte(a: &Version, b: &Version) -> bool {
    compare(a, b) != Ordering::Greater
}

/// `a > b` by precedence.
pub fn gt(a: &Version, b: &Version) -> bool {
    compare(a, b) == Ordering::Greater
}
