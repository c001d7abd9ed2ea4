//! Builders shared by the use case tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use npm_registry::{Lookup, PackageMetadata};
use package_json::{DeclaredDependency, DependencySection};
use semver::Version;
use serde_json::{json, Map, Value};

pub fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

pub fn manifest(entries: &[(&str, &str)]) -> BTreeMap<String, DeclaredDependency> {
    entries
        .iter()
        .map(|(name, range)| {
            (
                name.to_string(),
                DeclaredDependency {
                    name: name.to_string(),
                    range: range.to_string(),
                    section: DependencySection::Dependencies,
                },
            )
        })
        .collect()
}

/// A registry document under construction.
pub struct PackageDoc {
    name: String,
    dist_tags: Map<String, Value>,
    versions: Map<String, Value>,
}

pub fn package(name: &str) -> PackageDoc {
    PackageDoc {
        name: name.to_string(),
        dist_tags: Map::new(),
        versions: Map::new(),
    }
}

impl PackageDoc {
    /// A published version without peers or update metadata.
    pub fn version(self, version: &str) -> Self {
        self.version_with(version, json!({}))
    }

    pub fn version_with(mut self, version: &str, mut manifest: Value) -> Self {
        if let Value::Object(fields) = &mut manifest {
            fields.insert("name".to_string(), json!(self.name));
            fields.insert("version".to_string(), json!(version));
        }
        self.versions.insert(version.to_string(), manifest);
        self
    }

    pub fn tag(mut self, tag: &str, version: &str) -> Self {
        self.dist_tags.insert(tag.to_string(), json!(version));
        self
    }

    pub fn document(&self) -> Value {
        json!({
            "name": self.name,
            "dist-tags": self.dist_tags,
            "versions": self.versions,
        })
    }

    pub fn build(self) -> Arc<PackageMetadata> {
        Arc::new(PackageMetadata::from_document(&self.name, self.document()).unwrap())
    }
}

pub fn lookups<I>(packages: I) -> BTreeMap<String, Lookup>
where
    I: IntoIterator<Item = Arc<PackageMetadata>>,
{
    packages
        .into_iter()
        .map(|metadata| (metadata.name.clone(), Lookup::Found(metadata)))
        .collect()
}
