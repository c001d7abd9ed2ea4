//! Registry document model and the one-time decode of loosely typed metadata.

use std::collections::BTreeMap;

use semver::Version;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use version_util::{max_satisfying, RangeError, VersionRange};

use crate::error::DecodeError;

/// Key of the update metadata block inside a published `package.json`.
pub const UPDATE_METADATA_KEY: &str = "ng-update";

/// Outcome of decoding one loosely typed field.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult<T> {
    Valid(T),
    /// The field was present with the wrong shape; the raw value is kept for
    /// diagnostics.
    Malformed(Value),
}

impl<T> ParseResult<T> {
    pub fn valid(self) -> Option<T> {
        match self {
            ParseResult::Valid(v) => Some(v),
            ParseResult::Malformed(_) => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ParseResult::Malformed(_))
    }
}

/// A field that failed its shape check and was replaced by its default.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedField {
    /// Field name, e.g. "packageGroup"
    pub field: &'static str,
    /// The value as published
    pub raw: Value,
}

impl MalformedField {
    fn new(field: &'static str, raw: Value) -> Self {
        Self { field, raw }
    }
}

/// Validated update metadata of one published version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateMetadata {
    /// Packages that move together with this one
    pub package_group: Vec<String>,
    /// Display name of the group, overrides the first member
    pub package_group_name: Option<String>,
    /// Ranges other packages must satisfy
    pub requirements: BTreeMap<String, String>,
    /// Migration collection, a package relative path (`./migrations.json`)
    /// or an external collection name
    pub migrations: Option<String>,
}

impl UpdateMetadata {
    /// Decode the raw update metadata block. Returns the validated metadata and
    /// every field that had to be ignored.
    pub fn decode(raw: Option<&Value>) -> (Self, Vec<MalformedField>) {
        let mut metadata = UpdateMetadata::default();
        let mut malformed = Vec::new();

        let object = match raw {
            None | Some(Value::Null) => return (metadata, malformed),
            Some(Value::Object(object)) => object,
            Some(other) => {
                malformed.push(MalformedField::new(UPDATE_METADATA_KEY, other.clone()));
                return (metadata, malformed);
            }
        };

        if let Some(raw) = present(object.get("packageGroup")) {
            match string_array(raw) {
                ParseResult::Valid(group) => metadata.package_group = group,
                ParseResult::Malformed(raw) => {
                    malformed.push(MalformedField::new("packageGroup", raw))
                }
            }
        }

        if let Some(raw) = present(object.get("packageGroupName")) {
            match string(raw) {
                ParseResult::Valid(name) => metadata.package_group_name = Some(name),
                ParseResult::Malformed(raw) => {
                    malformed.push(MalformedField::new("packageGroupName", raw))
                }
            }
        }

        if let Some(raw) = present(object.get("requirements")) {
            match string_map(raw) {
                ParseResult::Valid(requirements) => metadata.requirements = requirements,
                ParseResult::Malformed(raw) => {
                    malformed.push(MalformedField::new("requirements", raw))
                }
            }
        }

        if let Some(raw) = present(object.get("migrations")) {
            match string(raw) {
                ParseResult::Valid(migrations) => metadata.migrations = Some(migrations),
                ParseResult::Malformed(raw) => {
                    malformed.push(MalformedField::new("migrations", raw))
                }
            }
        }

        (metadata, malformed)
    }

    /// Name used when talking to users about this package's group.
    pub fn group_name(&self) -> Option<&str> {
        self.package_group_name
            .as_deref()
            .or_else(|| self.package_group.first().map(String::as_str))
    }
}

/// One published version of a package.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionManifest {
    pub name: String,
    pub version: Version,
    pub peer_dependencies: BTreeMap<String, String>,
    pub update_metadata: UpdateMetadata,
    /// Whether the manifest carries an update metadata block at all
    pub declares_update_metadata: bool,
    /// Fields that were ignored because of their shape
    pub malformed: Vec<MalformedField>,
}

impl VersionManifest {
    pub fn from_value(name: &str, version: Version, value: &Value) -> Self {
        let mut malformed = Vec::new();

        let peer_dependencies = match present(value.get("peerDependencies")) {
            None => BTreeMap::new(),
            Some(raw) => match string_map(raw) {
                ParseResult::Valid(peers) => peers,
                ParseResult::Malformed(raw) => {
                    malformed.push(MalformedField::new("peerDependencies", raw));
                    BTreeMap::new()
                }
            },
        };

        let raw_update = value.get(UPDATE_METADATA_KEY);
        let (update_metadata, update_malformed) = UpdateMetadata::decode(raw_update);
        malformed.extend(update_malformed);

        Self {
            name: name.to_string(),
            version,
            peer_dependencies,
            update_metadata,
            declares_update_metadata: matches!(raw_update, Some(Value::Object(_))),
            malformed,
        }
    }

    /// Decode a `package.json` read from disk. `None` when it has no valid
    /// `name` and `version`.
    pub fn from_package_json(value: &Value) -> Option<Self> {
        let name = value.get("name")?.as_str()?;
        let version = Version::parse(value.get("version")?.as_str()?).ok()?;
        Some(Self::from_value(name, version, value))
    }
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "dist-tags", default)]
    dist_tags: BTreeMap<String, Value>,
    #[serde(default)]
    versions: BTreeMap<String, Value>,
}

/// A package document as served by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageMetadata {
    pub name: String,
    pub dist_tags: BTreeMap<String, Version>,
    pub versions: BTreeMap<Version, VersionManifest>,
}

impl PackageMetadata {
    /// Decode a registry document. Version keys and dist-tags that are not
    /// valid semver are dropped.
    pub fn from_document(requested_name: &str, document: Value) -> Result<Self, DecodeError> {
        // serde also reads a JSON array as a struct
        if !document.is_object() {
            return Err(DecodeError::NotAnObject(requested_name.to_string()));
        }
        let raw: RawDocument =
            serde_json::from_value(document).map_err(|source| DecodeError::InvalidDocument {
                name: requested_name.to_string(),
                source,
            })?;
        let name = raw.name.unwrap_or_else(|| requested_name.to_string());

        let mut versions = BTreeMap::new();
        for (key, value) in &raw.versions {
            match Version::parse(key) {
                Ok(version) => {
                    let manifest = VersionManifest::from_value(&name, version.clone(), value);
                    versions.insert(version, manifest);
                }
                Err(e) => debug!("dropping version {:?} of {}: {}", key, name, e),
            }
        }

        let mut dist_tags = BTreeMap::new();
        for (tag, value) in raw.dist_tags {
            match value.as_str().map(Version::parse) {
                Some(Ok(version)) => {
                    dist_tags.insert(tag, version);
                }
                _ => debug!("dropping dist-tag {} of {}: {}", tag, name, value),
            }
        }

        Ok(Self {
            name,
            dist_tags,
            versions,
        })
    }

    pub fn dist_tag(&self, tag: &str) -> Option<&Version> {
        self.dist_tags.get(tag)
    }

    pub fn manifest(&self, version: &Version) -> Option<&VersionManifest> {
        self.versions.get(version)
    }

    /// Resolve a requested spec to a published version: a dist-tag name
    /// wins, anything else is read as a range (an exact version is a range
    /// too) and resolved to the newest satisfying version.
    ///
    /// `Ok(None)` means the spec is valid but nothing published matches.
    pub fn resolve_spec(&self, spec: &str) -> Result<Option<&Version>, RangeError> {
        if let Some(tagged) = self.dist_tags.get(spec) {
            return Ok(self.versions.get_key_value(tagged).map(|(version, _)| version));
        }
        let range = VersionRange::parse(spec)?;
        Ok(max_satisfying(self.versions.keys(), &range))
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn string(value: &Value) -> ParseResult<String> {
    match value {
        Value::String(s) => ParseResult::Valid(s.clone()),
        other => ParseResult::Malformed(other.clone()),
    }
}

fn string_array(value: &Value) -> ParseResult<Vec<String>> {
    let strings = value
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        });
    match strings {
        Some(strings) => ParseResult::Valid(strings),
        None => ParseResult::Malformed(value.clone()),
    }
}

fn string_map(value: &Value) -> ParseResult<BTreeMap<String, String>> {
    let map = value.as_object().and_then(|object| {
        object
            .iter()
            .map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
            .collect::<Option<BTreeMap<_, _>>>()
    });
    match map {
        Some(map) => ParseResult::Valid(map),
        None => ParseResult::Malformed(value.clone()),
    }
}
