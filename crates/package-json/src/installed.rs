//! Locally installed packages under `node_modules`.

use std::path::{Path, PathBuf};

use semver::Version;
use serde_json::Value;
use tracing::debug;

use crate::error::ManifestError;
use crate::manifest::read_json;

/// A package found on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct InstalledPackage {
    pub version: Version,
    /// The installed `package.json`
    pub document: Value,
}

/// The project's `node_modules` directory.
#[derive(Debug, Clone)]
pub struct NodeModules {
    dir: PathBuf,
}

impl NodeModules {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            dir: project_root.as_ref().join("node_modules"),
        }
    }

    /// Exact version and manifest of an installed package. `None` when it is
    /// not installed or its `package.json` is unreadable or has no valid
    /// version.
    pub fn installed(&self, name: &str) -> Option<InstalledPackage> {
        let path = self.package_dir(name).join("package.json");
        let document = match read_json(&path) {
            Ok(document) => document,
            Err(ManifestError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                return None
            }
            Err(e) => {
                debug!("ignoring installed manifest of {}: {}", name, e);
                return None;
            }
        };
        let version = document
            .get("version")
            .and_then(Value::as_str)
            .and_then(|v| Version::parse(v).ok())?;
        Some(InstalledPackage { version, document })
    }

    /// Read a JSON file that lives inside an installed package.
    pub fn read_package_file(&self, name: &str, relative: &str) -> Result<Value, ManifestError> {
        let relative = relative.trim_start_matches("./").trim_start_matches('/');
        read_json(&self.package_dir(name).join(relative))
    }

    pub fn package_dir(&self, name: &str) -> PathBuf {
        // scoped names map onto nested directories
        name.split('/').fold(self.dir.clone(), |dir, part| dir.join(part))
    }
}
