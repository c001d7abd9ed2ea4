//! The project's `package.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use semver::Version;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ManifestError;
use crate::section::DependencySection;

/// One name in the merged dependency view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    pub name: String,
    pub range: String,
    /// The strongest section that declares the name
    pub section: DependencySection,
}

/// What a write-back did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// The document differs from what was read
    pub changed: bool,
    /// Names that no dependency section declares
    pub not_declared: Vec<String>,
}

/// A parsed `package.json` document.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageJson {
    document: Map<String, Value>,
}

impl PackageJson {
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        Self::from_text(Path::new("package.json"), text)
    }

    fn from_text(path: &Path, text: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        match value {
            Value::Object(document) => Ok(Self { document }),
            _ => Err(ManifestError::NotAnObject(path.to_path_buf())),
        }
    }

    /// Entries of one section. Entries whose value is not a string are skipped.
    pub fn section(&self, section: DependencySection) -> Vec<(String, String)> {
        let Some(entries) = self.document.get(section.as_str()) else {
            return Vec::new();
        };
        let Some(entries) = entries.as_object() else {
            debug!("{} is not an object", section);
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|(name, range)| match range.as_str() {
                Some(range) => Some((name.clone(), range.to_string())),
                None => {
                    debug!("skipping {} in {}: not a string", name, section);
                    None
                }
            })
            .collect()
    }

    /// Every entry of every section, duplicates across sections included.
    pub fn entries(&self) -> Vec<DeclaredDependency> {
        DependencySection::PRECEDENCE
            .into_iter()
            .flat_map(|section| {
                self.section(section)
                    .into_iter()
                    .map(move |(name, range)| DeclaredDependency {
                        name,
                        range,
                        section,
                    })
            })
            .collect()
    }

    /// Merged name → dependency view. When a name is declared in several
    /// sections the strongest one wins.
    pub fn dependencies(&self) -> BTreeMap<String, DeclaredDependency> {
        let mut merged = BTreeMap::new();
        // weakest first, stronger sections overwrite
        for dependency in self.entries().into_iter().rev() {
            merged.insert(dependency.name.clone(), dependency);
        }
        merged
    }

    /// Write exact versions into the strongest section that declares each
    /// name, and drop the name from the weaker sections.
    pub fn apply_resolved_versions(&mut self, versions: &BTreeMap<String, Version>) -> WriteOutcome {
        let before = self.document.clone();
        let mut outcome = WriteOutcome::default();

        for (name, version) in versions {
            let Some(section) = DependencySection::PRECEDENCE
                .into_iter()
                .find(|section| self.declares(*section, name))
            else {
                warn!("package {} was not found in dependencies", name);
                outcome.not_declared.push(name.clone());
                continue;
            };

            if let Some(entries) = self.section_mut(section) {
                entries.insert(name.clone(), Value::String(version.to_string()));
            }
            for weaker in section.weaker() {
                if let Some(entries) = self.section_mut(weaker) {
                    entries.shift_remove(name);
                }
            }
        }

        outcome.changed = before != self.document;
        outcome
    }

    /// Two-space pretty JSON with a trailing newline.
    pub fn to_pretty_string(&self) -> String {
        let mut text = serde_json::to_string_pretty(&self.document).unwrap_or_default();
        text.push('\n');
        text
    }

    fn declares(&self, section: DependencySection, name: &str) -> bool {
        self.document
            .get(section.as_str())
            .and_then(Value::as_object)
            .is_some_and(|entries| entries.contains_key(name))
    }

    fn section_mut(&mut self, section: DependencySection) -> Option<&mut Map<String, Value>> {
        self.document
            .get_mut(section.as_str())
            .and_then(Value::as_object_mut)
    }
}

/// The `package.json` at the root of a project.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
    package_json: PackageJson,
}

impl ManifestStore {
    pub fn open(project_root: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = project_root.as_ref().join("package.json");
        let text = fs::read_to_string(&path).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;
        let package_json = PackageJson::from_text(&path, &text)?;
        Ok(Self { path, package_json })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn package_json(&self) -> &PackageJson {
        &self.package_json
    }

    pub fn read_dependencies(&self) -> BTreeMap<String, DeclaredDependency> {
        self.package_json.dependencies()
    }

    /// Apply the versions and write the file, only when something changed.
    pub fn write_resolved_versions(
        &mut self,
        versions: &BTreeMap<String, Version>,
    ) -> Result<WriteOutcome, ManifestError> {
        let outcome = self.package_json.apply_resolved_versions(versions);
        if outcome.changed {
            fs::write(&self.path, self.package_json.to_pretty_string()).map_err(|source| {
                ManifestError::Io {
                    path: self.path.clone(),
                    source,
                }
            })?;
            debug!("wrote {}", self.path.display());
        }
        Ok(outcome)
    }
}

pub(crate) fn read_json(path: &Path) -> Result<Value, ManifestError> {
    let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
  "name": "my-app",
  "version": "0.0.0",
  "dependencies": {
    "@angular/core": "^7.0.0",
    "rxjs": "~6.3.0",
    "left-pad": "^1.0.0"
  },
  "devDependencies": {
    "typescript": "~3.1.0",
    "rxjs": "^6.0.0",
    "tslint": 5
  },
  "peerDependencies": {
    "typescript": ">=3.0.0",
    "zone.js": "^0.8.0"
  }
}
"#;

    fn versions(entries: &[(&str, &str)]) -> BTreeMap<String, Version> {
        entries
            .iter()
            .map(|(name, version)| (name.to_string(), Version::parse(version).unwrap()))
            .collect()
    }

    #[test]
    fn test_merged_view_prefers_stronger_sections() {
        let package_json = PackageJson::parse(MANIFEST).unwrap();
        let deps = package_json.dependencies();

        assert_eq!(deps.len(), 5);
        assert_eq!(deps["rxjs"].range, "~6.3.0");
        assert_eq!(deps["rxjs"].section, DependencySection::Dependencies);
        assert_eq!(deps["typescript"].range, "~3.1.0");
        assert_eq!(deps["typescript"].section, DependencySection::DevDependencies);
        assert_eq!(deps["zone.js"].section, DependencySection::PeerDependencies);
        // non-string ranges are skipped
        assert!(!deps.contains_key("tslint"));
    }

    #[test]
    fn test_entries_keep_duplicates() {
        let package_json = PackageJson::parse(MANIFEST).unwrap();
        let rxjs = package_json
            .entries()
            .into_iter()
            .filter(|d| d.name == "rxjs")
            .count();
        assert_eq!(rxjs, 2);
    }

    #[test]
    fn test_apply_resolved_versions() {
        let mut package_json = PackageJson::parse(MANIFEST).unwrap();
        let outcome = package_json.apply_resolved_versions(&versions(&[
            ("rxjs", "6.4.0"),
            ("typescript", "3.2.4"),
            ("zone.js", "0.8.29"),
            ("not-here", "1.0.0"),
        ]));

        assert!(outcome.changed);
        assert_eq!(outcome.not_declared, vec!["not-here"]);

        let deps = package_json.section(DependencySection::Dependencies);
        assert!(deps.contains(&("rxjs".to_string(), "6.4.0".to_string())));
        let dev = package_json.section(DependencySection::DevDependencies);
        assert!(dev.contains(&("typescript".to_string(), "3.2.4".to_string())));
        assert!(!dev.iter().any(|(name, _)| name == "rxjs"));
        let peer = package_json.section(DependencySection::PeerDependencies);
        assert_eq!(peer, vec![("zone.js".to_string(), "0.8.29".to_string())]);
    }

    #[test]
    fn test_key_order_is_preserved() {
        let mut package_json = PackageJson::parse(MANIFEST).unwrap();
        package_json.apply_resolved_versions(&versions(&[("@angular/core", "7.2.0")]));

        let text = package_json.to_pretty_string();
        let core = text.find("@angular/core").unwrap();
        let rxjs = text.find("\"rxjs\"").unwrap();
        let left_pad = text.find("left-pad").unwrap();
        assert!(core < rxjs && rxjs < left_pad);
        assert!(text.contains("\"@angular/core\": \"7.2.0\""));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_unchanged_when_versions_match() {
        let mut package_json = PackageJson::parse(
            r#"{ "dependencies": { "left-pad": "1.3.0" } }"#,
        )
        .unwrap();
        let outcome = package_json.apply_resolved_versions(&versions(&[("left-pad", "1.3.0")]));
        assert!(!outcome.changed);
    }

    #[test]
    fn test_store_writes_only_on_change() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("package.json");
        fs::write(&path, MANIFEST).unwrap();

        let mut store = ManifestStore::open(tmp.path()).unwrap();
        assert_eq!(store.read_dependencies()["left-pad"].range, "^1.0.0");

        let outcome = store
            .write_resolved_versions(&versions(&[("left-pad", "1.3.0")]))
            .unwrap();
        assert!(outcome.changed);

        let reopened = ManifestStore::open(tmp.path()).unwrap();
        assert_eq!(reopened.read_dependencies()["left-pad"].range, "1.3.0");

        // same content again: the file is left alone
        let written = fs::read_to_string(&path).unwrap();
        fs::write(&path, written.replace('\n', "\r\n")).unwrap();
        let mut store = ManifestStore::open(tmp.path()).unwrap();
        let outcome = store
            .write_resolved_versions(&versions(&[("left-pad", "1.3.0")]))
            .unwrap();
        assert!(!outcome.changed);
        assert!(fs::read_to_string(&path).unwrap().contains("\r\n"));
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            PackageJson::parse("[1, 2]"),
            Err(ManifestError::NotAnObject(_))
        ));
        assert!(matches!(
            PackageJson::parse("{"),
            Err(ManifestError::Parse { .. })
        ));

        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            ManifestStore::open(tmp.path()),
            Err(ManifestError::Io { .. })
        ));
    }
}
