//! # npm-registry
//!
//! Registry metadata for the upgrade planner: typed package documents and a
//! gateway that memoizes lookups for the lifetime of one planning run.
//!
//! ## Overview
//!
//! - [`PackageMetadata`]: one registry document (`dist-tags` + `versions`)
//! - [`VersionManifest`]: one published version's peer dependencies and
//!   validated [`UpdateMetadata`]
//! - [`MetadataGateway`]: per-run cache in front of a [`RegistryTransport`];
//!   concurrent lookups of the same name share a single in-flight request
//! - [`HttpTransport`]: `reqwest` transport against an npm compatible registry
//!
//! Loosely typed JSON is decoded exactly once, here. Fields of the update
//! metadata that have the wrong shape decode to [`ParseResult::Malformed`],
//! are replaced by defaults, and are kept on the manifest so callers can warn
//! about them. Nothing downstream ever sees raw metadata maps.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use npm_registry::{HttpTransport, Lookup, MetadataGateway};
//!
//! let transport = HttpTransport::new(url::Url::parse("https://registry.npmjs.org/")?, None)?;
//! let gateway = MetadataGateway::new(Arc::new(transport));
//!
//! let lookups = gateway.fetch_batch(["left-pad".to_string(), "rxjs".to_string()]).await;
//! if let Some(Lookup::Found(metadata)) = lookups.get("rxjs") {
//!     println!("latest: {:?}", metadata.dist_tag("latest"));
//! }
//! ```
//!
//! ## Complexity
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `fetch()` first call per name | network I/O |
//! | `fetch()` repeated / concurrent | O(1), shares the first call |
//! | `resolve_spec()` | O(v) over published versions |

mod error;
mod gateway;
mod metadata;
mod transport;

pub use error::{DecodeError, TransportError};
pub use gateway::{Lookup, MetadataGateway};
pub use metadata::{
    MalformedField, PackageMetadata, ParseResult, UpdateMetadata, VersionManifest,
    UPDATE_METADATA_KEY,
};
pub use transport::{HttpTransport, RegistryTransport};
