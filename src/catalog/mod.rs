//! Dataset catalog: identifier resolution and repository listing.
//!
//! A [`Catalog`] ties a [`Repository`] root to a [`DatasetStore`] and the
//! location advertised in endpoints. It keeps no state between calls; every
//! resolution re-reads the repository and re-probes the schema.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use flightshelf::catalog::{Catalog, DatasetId, Repository};
//! use flightshelf::store::ParquetStore;
//!
//! let repo = Repository::open("./datasets")?;
//! let catalog = Catalog::new(repo, Arc::new(ParquetStore::default()), "grpc://0.0.0.0:8815");
//! let info = catalog.resolve(&DatasetId::new("sales")?)?;
//! println!("{} columns", info.schema.fields().len());
//! # Ok::<(), flightshelf::CatalogError>(())
//! ```

mod descriptor;
mod ids;
mod info;
mod listing;
mod repository;
mod resolve;

pub use descriptor::DatasetDescriptor;
pub use ids::{decode, encode, DatasetId};
pub use info::{DatasetInfo, Endpoint, UNKNOWN_COUNT};
pub use listing::{ListErrorPolicy, ListOptions, Listing};
pub use repository::Repository;

pub(crate) use repository::is_hidden_name;
pub(crate) use resolve::attribute_to;

use std::fmt;
use std::sync::Arc;

use crate::store::{DatasetStore, Partitioning};

/// Resolves dataset identifiers against one repository root.
#[derive(Clone)]
pub struct Catalog {
    repository: Repository,
    store: Arc<dyn DatasetStore>,
    location: String,
    partitioning: Partitioning,
    list_options: ListOptions,
}

impl Catalog {
    /// Creates a catalog advertising `location` in every endpoint.
    ///
    /// Hive partitioning and the default listing options apply until
    /// overridden.
    pub fn new(
        repository: Repository,
        store: Arc<dyn DatasetStore>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            store,
            location: location.into(),
            partitioning: Partitioning::Hive,
            list_options: ListOptions::default(),
        }
    }

    /// Replace the listing options.
    pub fn with_list_options(mut self, list_options: ListOptions) -> Self {
        self.list_options = list_options;
        self
    }

    /// Replace the partitioning used for both schema probes and reads.
    pub fn with_partitioning(mut self, partitioning: Partitioning) -> Self {
        self.partitioning = partitioning;
        self
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn store(&self) -> &dyn DatasetStore {
        self.store.as_ref()
    }

    /// The location placed in every endpoint.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn partitioning(&self) -> Partitioning {
        self.partitioning
    }

    pub fn list_options(&self) -> ListOptions {
        self.list_options
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("root", &self.repository.root())
            .field("location", &self.location)
            .field("partitioning", &self.partitioning)
            .field("list_options", &self.list_options)
            .finish()
    }
}
