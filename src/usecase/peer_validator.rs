//! Forward and reverse peer dependency checks over the whole record set.

use std::collections::BTreeMap;

use version_util::satisfies;

use crate::entity::{Diagnostic, PackageRecord, PeerViolation, PlanError};

/// Every peer requirement that would not hold after the run.
///
/// Forward: each moving package's new peers must be satisfied by what will be
/// installed. Reverse: every other package's peer requirement on a moving
/// package must accept its new version. Both passes always run to the end.
/// A violation found by both passes is reported once. A range that does not
/// parse is treated as unsatisfied.
pub fn validate(records: &BTreeMap<String, PackageRecord>) -> Vec<PeerViolation> {
    let mut violations = Vec::new();

    for record in records.values() {
        let Some(target) = &record.target else {
            continue;
        };

        for (peer, required) in &target.manifest.peer_dependencies {
            let violation = match records.get(peer) {
                None => Some(PeerViolation::Missing {
                    consumer: record.name.clone(),
                    peer: peer.clone(),
                    required: required.clone(),
                }),
                Some(peer_record) => {
                    let would_install = peer_record.effective_version();
                    (!satisfies(would_install, required)).then(|| PeerViolation::Incompatible {
                        consumer: record.name.clone(),
                        peer: peer.clone(),
                        required: required.clone(),
                        would_install: would_install.clone(),
                    })
                }
            };
            push_unique(&mut violations, violation);
        }
    }

    for mover in records.values() {
        let Some(target) = &mover.target else {
            continue;
        };

        for consumer in records.values().filter(|r| r.name != mover.name) {
            let Some(required) = consumer.effective_manifest().peer_dependencies.get(&mover.name)
            else {
                continue;
            };
            let violation = (!satisfies(&target.version, required)).then(|| {
                PeerViolation::Incompatible {
                    consumer: consumer.name.clone(),
                    peer: mover.name.clone(),
                    required: required.clone(),
                    would_install: target.version.clone(),
                }
            });
            push_unique(&mut violations, violation);
        }
    }

    violations
}

/// Fail on any violation unless forced; forced violations become warnings.
pub fn enforce(violations: Vec<PeerViolation>, force: bool) -> Result<Vec<Diagnostic>, PlanError> {
    if violations.is_empty() {
        return Ok(Vec::new());
    }
    if !force {
        return Err(PlanError::PeerValidationFailed(violations));
    }
    Ok(violations
        .into_iter()
        .map(|v| Diagnostic::warn(v.to_string()).package(v.consumer()))
        .collect())
}

fn push_unique(violations: &mut Vec<PeerViolation>, violation: Option<PeerViolation>) {
    if let Some(violation) = violation {
        if !violations.contains(&violation) {
            violations.push(violation);
        }
    }
}

#[cfg(test)]
mod tests {
    use npm_registry::VersionManifest;
    use serde_json::{json, Value};

    use super::*;
    use crate::entity::{Level, ResolvedVersion};
    use crate::usecase::fixture::v;

    fn resolved(name: &str, version: &str, peers: Value) -> ResolvedVersion {
        let manifest =
            VersionManifest::from_value(name, v(version), &json!({ "peerDependencies": peers }));
        ResolvedVersion::new(v(version), manifest)
    }

    fn record(name: &str, installed: (&str, Value), target: Option<(&str, Value)>) -> PackageRecord {
        PackageRecord::new(
            name,
            "*",
            resolved(name, installed.0, installed.1),
            target.map(|(version, peers)| resolved(name, version, peers)),
        )
    }

    fn records(list: Vec<PackageRecord>) -> BTreeMap<String, PackageRecord> {
        list.into_iter().map(|r| (r.name.clone(), r)).collect()
    }

    #[test]
    fn test_forward_incompatible_peer() {
        let records = records(vec![
            record("a", ("1.0.0", json!({})), Some(("2.0.0", json!({ "b": "^2.0.0" })))),
            record("b", ("1.0.0", json!({})), Some(("1.9.0", json!({})))),
        ]);

        let violations = validate(&records);
        assert_eq!(
            violations,
            vec![PeerViolation::Incompatible {
                consumer: "a".to_string(),
                peer: "b".to_string(),
                required: "^2.0.0".to_string(),
                would_install: v("1.9.0"),
            }]
        );
    }

    #[test]
    fn test_forward_uses_installed_when_peer_stays() {
        let records = records(vec![
            record("a", ("1.0.0", json!({})), Some(("2.0.0", json!({ "b": "^1.2.0" })))),
            record("b", ("1.4.0", json!({})), None),
        ]);
        assert!(validate(&records).is_empty());
    }

    #[test]
    fn test_missing_peer() {
        let records = records(vec![record(
            "a",
            ("1.0.0", json!({})),
            Some(("2.0.0", json!({ "zone.js": "^0.8.0" }))),
        )]);
        assert_eq!(
            validate(&records),
            vec![PeerViolation::Missing {
                consumer: "a".to_string(),
                peer: "zone.js".to_string(),
                required: "^0.8.0".to_string(),
            }]
        );
    }

    #[test]
    fn test_reverse_incompatible_peer() {
        // c stays on a version whose peer range rejects b's new major
        let records = records(vec![
            record("b", ("1.0.0", json!({})), Some(("2.0.0", json!({})))),
            record("c", ("3.0.0", json!({ "b": "^1.0.0" })), None),
        ]);
        assert_eq!(
            validate(&records),
            vec![PeerViolation::Incompatible {
                consumer: "c".to_string(),
                peer: "b".to_string(),
                required: "^1.0.0".to_string(),
                would_install: v("2.0.0"),
            }]
        );
    }

    #[test]
    fn test_reverse_uses_consumer_target() {
        // c moves too, and its new version accepts b@2
        let records = records(vec![
            record("b", ("1.0.0", json!({})), Some(("2.0.0", json!({})))),
            record(
                "c",
                ("3.0.0", json!({ "b": "^1.0.0" })),
                Some(("4.0.0", json!({ "b": "^2.0.0" }))),
            ),
        ]);
        assert!(validate(&records).is_empty());
    }

    #[test]
    fn test_all_violations_are_reported() {
        let records = records(vec![
            record("a", ("1.0.0", json!({})), Some(("2.0.0", json!({ "b": "^2.0.0" })))),
            record("b", ("1.0.0", json!({})), None),
            record("c", ("1.0.0", json!({})), Some(("2.0.0", json!({ "d": "^5.0.0" })))),
            record("d", ("4.0.0", json!({})), None),
        ]);
        let violations = validate(&records);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].consumer(), "a");
        assert_eq!(violations[1].consumer(), "c");
    }

    #[test]
    fn test_unparsable_range_is_a_violation() {
        let records = records(vec![
            record("a", ("1.0.0", json!({})), Some(("2.0.0", json!({ "b": "not a range" })))),
            record("b", ("1.0.0", json!({})), None),
        ]);
        assert_eq!(validate(&records).len(), 1);
    }

    #[test]
    fn test_enforce() {
        let violation = PeerViolation::Missing {
            consumer: "a".to_string(),
            peer: "b".to_string(),
            required: "^1.0.0".to_string(),
        };

        assert!(enforce(Vec::new(), false).unwrap().is_empty());
        assert!(matches!(
            enforce(vec![violation.clone()], false),
            Err(PlanError::PeerValidationFailed(list)) if list.len() == 1
        ));

        let diagnostics = enforce(vec![violation], true).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].level, Level::Warn);
        assert_eq!(diagnostics[0].package.as_deref(), Some("a"));
    }
}
