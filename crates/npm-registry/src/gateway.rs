//! Per-run memoizing gateway in front of a registry transport.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::future::join_all;
use moka::future::Cache;
use tracing::{debug, warn};

use crate::metadata::PackageMetadata;
use crate::transport::RegistryTransport;

/// Upper bound on distinct names in one run. Nothing is ever evicted below it.
const MAX_PACKAGES: u64 = 10_000;

/// Result of one registry lookup.
#[derive(Debug, Clone)]
pub enum Lookup {
    Found(Arc<PackageMetadata>),
    /// Unknown to the registry, unreachable, or not a package document.
    NotFound,
}

impl Lookup {
    pub fn found(&self) -> Option<&Arc<PackageMetadata>> {
        match self {
            Lookup::Found(metadata) => Some(metadata),
            Lookup::NotFound => None,
        }
    }
}

/// Registry lookups for the lifetime of one planning run.
///
/// The first lookup of a name goes to the transport; every later or
/// concurrent lookup of the same name awaits that same request. Results,
/// `NotFound` included, are never replaced.
pub struct MetadataGateway {
    transport: Arc<dyn RegistryTransport>,
    cache: Cache<String, Lookup>,
}

impl MetadataGateway {
    pub fn new(transport: Arc<dyn RegistryTransport>) -> Self {
        Self {
            transport,
            cache: Cache::builder().max_capacity(MAX_PACKAGES).build(),
        }
    }

    pub async fn fetch(&self, name: &str) -> Lookup {
        self.cache.get_with_by_ref(name, self.load(name)).await
    }

    /// Fetch every name concurrently. The map does not depend on the order
    /// in which the requests complete.
    pub async fn fetch_batch<I>(&self, names: I) -> BTreeMap<String, Lookup>
    where
        I: IntoIterator<Item = String>,
    {
        let names: BTreeSet<String> = names.into_iter().collect();
        let lookups = join_all(names.iter().map(|name| self.fetch(name))).await;
        names.into_iter().zip(lookups).collect()
    }

    async fn load(&self, name: &str) -> Lookup {
        let document = match self.transport.fetch_document(name).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!("{} is not in the registry", name);
                return Lookup::NotFound;
            }
            Err(e) => {
                warn!("{}", e);
                return Lookup::NotFound;
            }
        };

        match PackageMetadata::from_document(name, document) {
            Ok(metadata) => {
                debug!(
                    "fetched {} with {} versions",
                    name,
                    metadata.versions.len()
                );
                Lookup::Found(Arc::new(metadata))
            }
            Err(e) => {
                warn!("{}", e);
                Lookup::NotFound
            }
        }
    }
}
