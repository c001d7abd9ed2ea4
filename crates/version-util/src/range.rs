//! npm range parsing on top of `deno_semver`.

use std::fmt;
use std::str::FromStr;

use semver::Version;

use crate::compare::compare;
use crate::error::RangeError;

/// A parsed npm version range.
///
/// The grammar (`||` alternatives, hyphen ranges, x-ranges, operators with
/// spaces) is delegated to `deno_semver`, which applies npm's pre-release rule:
/// a pre-release only matches a comparator naming the same
/// `major.minor.patch` with a pre-release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    raw: String,
    req: deno_semver::VersionReq,
}

impl VersionRange {
    /// Parse an npm range such as `^1.2.0`, `>=1.0.0 <2`, `1.x || 2.x`
    /// or `1.0.0 - 1.4`. A dist-tag name is not a range.
    pub fn parse(raw: &str) -> Result<Self, RangeError> {
        let raw = raw.trim();
        let text = if raw.is_empty() { "*" } else { raw };
        let req = deno_semver::VersionReq::parse_from_npm(text).map_err(|e| {
            RangeError::Invalid {
                range: raw.to_string(),
                reason: e.to_string(),
            }
        })?;
        if req.tag().is_some() {
            return Err(RangeError::Tag(raw.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            req,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, version: &Version) -> bool {
        deno_semver::Version::parse_standard(&version.to_string())
            .is_ok_and(|version| self.req.matches(&version))
    }
}

impl FromStr for VersionRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// `true` when `range` parses and `version` satisfies it. An unparsable
/// range satisfies nothing.
pub fn satisfies(version: &Version, range: &str) -> bool {
    VersionRange::parse(range).is_ok_and(|range| range.matches(version))
}

/// Newest version (by precedence) among `versions` that satisfies `range`.
pub fn max_satisfying<'a, I>(versions: I, range: &VersionRange) -> Option<&'a Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    versions
        .into_iter()
        .filter(|v| range.matches(v))
        .max_by(|a, b| compare(a, b))
}
