//! Short version coercion.

use std::sync::OnceLock;

use regex::Regex;
use semver::Version;

static FULL_VERSION_RE: OnceLock<Regex> = OnceLock::new();
static NUMERIC_PREFIX_RE: OnceLock<Regex> = OnceLock::new();

fn full_version_re() -> &'static Regex {
    FULL_VERSION_RE.get_or_init(|| Regex::new(r"^\d{1,30}\.\d{1,30}\.\d{1,30}").unwrap())
}

fn numeric_prefix_re() -> &'static Regex {
    NUMERIC_PREFIX_RE.get_or_init(|| Regex::new(r"^\d{1,30}(?:\.\d{1,30})*").unwrap())
}

/// Cleans up "short" version numbers so they become valid semver.
///
/// ```text
/// 1        => 1.0.0
/// 1.2      => 1.2.0
/// 1-beta   => 1.0.0-beta
/// 1.2.3    => 1.2.3
/// ```
///
/// Missing components are inserted before any pre-release or build suffix.
/// Returns `None` for more than three numeric components, a non-numeric
/// leading segment, or anything else `semver` rejects. Callers decide
/// whether that is fatal.
pub fn coerce_version(version: &str) -> Option<Version> {
    let version = version.trim();
    if full_version_re().is_match(version) {
        return Version::parse(version).ok();
    }

    let prefix = numeric_prefix_re().find(version)?;
    let padding = match prefix.as_str().split('.').count() {
        1 => ".0.0",
        2 => ".0",
        _ => return None,
    };
    let (numeric, suffix) = version.split_at(prefix.end());
    Version::parse(&format!("{numeric}{padding}{suffix}")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_short_versions() {
        let cases = [
            ("1", "1.0.0"),
            ("1.2", "1.2.0"),
            ("1-beta", "1.0.0-beta"),
            ("1.2-rc.1", "1.2.0-rc.1"),
            ("1+build.5", "1.0.0+build.5"),
            ("8", "8.0.0"),
        ];
        for (input, expected) in cases {
            assert_eq!(
                coerce_version(input).map(|v| v.to_string()),
                Some(expected.to_string()),
                "coercing {input}"
            );
        }
    }

    #[test]
    fn test_coerce_full_version_is_identity() {
        for input in ["1.2.3", "0.0.1", "10.20.30-alpha.1", "2.0.0-rc.0+sha.abc"] {
            let coerced = coerce_version(input).unwrap();
            assert_eq!(coerced.to_string(), input);
            assert_eq!(coerce_version(&coerced.to_string()), Some(coerced));
        }
    }

    #[test]
    fn test_coerced_output_is_valid_semver() {
        for input in ["3", "3.1", "3-next.2", "3.1-beta"] {
            let coerced = coerce_version(input).unwrap();
            assert!(Version::parse(&coerced.to_string()).is_ok());
        }
    }

    #[test]
    fn test_coerce_rejects_malformed() {
        for input in ["", "v1", "beta", "1.2.3.4", "1.2.x", "a.b.c", ".1"] {
            assert_eq!(coerce_version(input), None, "coercing {input:?}");
        }
    }
}
