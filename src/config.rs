//! Runtime configuration for the catalog and the server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::{Catalog, ListOptions, Repository};
use crate::error::CatalogError;
use crate::store::{ParquetStore, DEFAULT_BATCH_SIZE};

/// Default listen address for `serve`.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8815";

/// Default repository root.
pub const DEFAULT_REPO: &str = "./datasets";

/// Settings the catalog core needs.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// Directory whose immediate children are datasets.
    pub repo: PathBuf,
    /// Location advertised in every endpoint.
    pub location: String,
    /// Maximum rows per streamed batch.
    pub batch_size: usize,
    /// Listing order and failure policy.
    pub list: ListOptions,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            repo: PathBuf::from(DEFAULT_REPO),
            location: format!("grpc://{DEFAULT_LISTEN}"),
            batch_size: DEFAULT_BATCH_SIZE,
            list: ListOptions::default(),
        }
    }
}

impl CatalogConfig {
    fn validate(&self) -> Result<(), CatalogError> {
        if self.batch_size == 0 {
            return Err(CatalogError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.location.trim().is_empty() {
            return Err(CatalogError::Config(
                "advertised location must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a catalog over an existing repository root.
    pub fn open_catalog(&self) -> Result<Catalog, CatalogError> {
        self.validate()?;
        let repository = Repository::open(&self.repo)?;
        Ok(self.catalog_for(repository))
    }

    /// Build a catalog, creating the repository root if it is absent.
    pub fn create_catalog(&self) -> Result<Catalog, CatalogError> {
        self.validate()?;
        let repository = Repository::create(&self.repo)?;
        Ok(self.catalog_for(repository))
    }

    fn catalog_for(&self, repository: Repository) -> Catalog {
        let store = Arc::new(ParquetStore::new(self.batch_size));
        Catalog::new(repository, store, self.location.clone()).with_list_options(self.list)
    }
}

/// Settings for `serve`.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub catalog: CatalogConfig,
}

impl ServerConfig {
    /// Combine a listen address with catalog settings.
    ///
    /// Without an explicit location, endpoints advertise `grpc://<listen>`.
    pub fn new(listen: SocketAddr, location: Option<String>, catalog: CatalogConfig) -> Self {
        let location = location.unwrap_or_else(|| format!("grpc://{listen}"));
        Self {
            listen,
            catalog: CatalogConfig { location, ..catalog },
        }
    }
}
