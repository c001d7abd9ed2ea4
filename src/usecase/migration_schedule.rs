//! Pick the entries of a migration collection that apply to one step.

use semver::Version;
use serde::Serialize;
use serde_json::Value;
use version_util::{coerce_version, compare, gt, lte};

use crate::entity::{MigrationStep, PlanError};

/// One migration of a collection, due for a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledMigration {
    pub name: String,
    pub version: Version,
    pub description: Option<String>,
}

/// Entries of `collection` (`{"schematics": {name: {"version", "description"}}}`)
/// whose version lies in `(from, to]`, ordered by version then name.
///
/// Entries without a string version never run. A version that cannot be
/// coerced fails the step.
pub fn schedule(collection: &Value, step: &MigrationStep) -> Result<Vec<ScheduledMigration>, PlanError> {
    let Some(entries) = collection.get("schematics").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let mut due = Vec::new();
    for (name, entry) in entries {
        let Some(raw) = entry.get("version").and_then(Value::as_str) else {
            continue;
        };
        let version = coerce_version(raw).ok_or_else(|| PlanError::InvalidVersionSpec {
            package: step.package_name.clone(),
            spec: raw.to_string(),
        })?;
        if gt(&version, &step.from_version) && lte(&version, &step.to_version) {
            due.push(ScheduledMigration {
                name: name.clone(),
                version,
                description: entry
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
        }
    }

    due.sort_by(|a, b| compare(&a.version, &b.version).then_with(|| a.name.cmp(&b.name)));
    Ok(due)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::usecase::fixture::v;

    fn step(from: &str, to: &str) -> MigrationStep {
        MigrationStep::new("@angular/core", "./migrations.json", v(from), v(to))
    }

    #[test]
    fn test_window_and_order() {
        let collection = json!({ "schematics": {
            "migration-v7-b": { "version": "7", "description": "second" },
            "migration-v7-a": { "version": "7.0.0-beta.1" },
            "migration-v6": { "version": "6" },
            "migration-v8": { "version": "8.0.0" },
            "migration-v7-c": { "version": "7.0" },
            "helper": { "description": "no version, never runs" }
        } });

        let due = schedule(&collection, &step("6.0.0", "7.2.0")).unwrap();
        let names: Vec<_> = due.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["migration-v7-a", "migration-v7-b", "migration-v7-c"]);
        assert_eq!(due[1].description.as_deref(), Some("second"));
        assert_eq!(due[2].version, v("7.0.0"));
    }

    #[test]
    fn test_upper_bound_is_inclusive() {
        let collection = json!({ "schematics": { "m": { "version": "7.0.0" } } });
        assert_eq!(schedule(&collection, &step("6.0.0", "7.0.0")).unwrap().len(), 1);
        assert!(schedule(&collection, &step("7.0.0", "8.0.0")).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_entry_version() {
        let collection = json!({ "schematics": { "m": { "version": "seven" } } });
        assert!(matches!(
            schedule(&collection, &step("6.0.0", "7.0.0")),
            Err(PlanError::InvalidVersionSpec { ref spec, .. }) if spec == "seven"
        ));
    }

    #[test]
    fn test_empty_collection() {
        assert!(schedule(&json!({}), &step("6.0.0", "7.0.0")).unwrap().is_empty());
    }
}
