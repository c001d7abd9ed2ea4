//! # package-json
//!
//! Read and write the project's `package.json` and look up what is installed
//! under `node_modules`.
//!
//! ## Overview
//!
//! - [`ManifestStore`]: the project manifest. Reads a merged name → range view
//!   across the dependency sections and writes resolved exact versions back
//!   into the section that already declares each name
//! - [`DependencySection`]: `dependencies` > `devDependencies` > `peerDependencies`
//! - [`NodeModules`]: exact versions and manifests of locally installed packages
//! - [`is_custom_version`]: ranges that point somewhere other than the registry
//!
//! Documents keep their key order, so a rewrite only touches the values that
//! changed.
//!
//! ## Example
//!
//! ```ignore
//! use std::collections::BTreeMap;
//! use package_json::ManifestStore;
//!
//! let mut store = ManifestStore::open("my-app")?;
//! for (name, dep) in store.read_dependencies() {
//!     println!("{name} {} ({})", dep.range, dep.section);
//! }
//!
//! let versions = BTreeMap::from([("left-pad".to_string(), semver::Version::new(1, 3, 0))]);
//! let outcome = store.write_resolved_versions(&versions)?;
//! assert!(outcome.changed);
//! ```

mod custom;
mod error;
mod installed;
mod manifest;
mod section;

pub use custom::is_custom_version;
pub use error::{ManifestError, UnknownSection};
pub use installed::{InstalledPackage, NodeModules};
pub use manifest::{DeclaredDependency, ManifestStore, PackageJson, WriteOutcome};
pub use section::DependencySection;
