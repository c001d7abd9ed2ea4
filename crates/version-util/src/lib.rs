//! # version-util
//!
//! npm-flavoured semver helpers built on top of the `semver` crate.
//!
//! Registry metadata and `package.json` files speak the npm range grammar
//! (`^1.2.0`, `1.x`, `>=1.0.0 <2`, `1.0.0 - 1.4.0`, `1 || 2`), which differs
//! from cargo's comma separated requirements. Ranges are parsed with
//! `deno_semver`, while versions stay `semver::Version` so every other
//! component works with one typed version.
//!
//! ## Overview
//!
//! - [`coerce_version`]: normalise short versions (`1`, `1.2`, `1-beta`)
//! - [`VersionRange`]: parsed npm range, `matches` against a `semver::Version`
//! - [`max_satisfying`]: newest version of a set that satisfies a range
//! - [`compare`], [`satisfies`], [`lte`], [`gt`]: semver precedence helpers
//!
//! ## Example
//!
//! ```ignore
//! use version_util::{coerce_version, max_satisfying, VersionRange};
//!
//! let range = VersionRange::parse("^1.2.0")?;
//! let versions = ["1.1.0", "1.2.5", "1.4.0", "2.0.0"]
//!     .iter()
//!     .map(|v| semver::Version::parse(v).unwrap())
//!     .collect::<Vec<_>>();
//!
//! assert_eq!(max_satisfying(&versions, &range).unwrap().to_string(), "1.4.0");
//! assert_eq!(coerce_version("1.2").unwrap().to_string(), "1.2.0");
//! ```

mod coerce;
mod compare;
mod error;
mod range;

pub use coerce::coerce_version;
pub use compare::{compare, gt, lte};
pub use error::RangeError;
pub use range::{max_satisfying, satisfies, VersionRange};

pub use semver::Version;
