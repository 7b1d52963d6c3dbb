use std::ffi::OsString;

use crate::error::CatalogError;

use super::{Catalog, DatasetId, DatasetInfo};

/// What a listing does when one entry fails to resolve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListErrorPolicy {
    /// Yield the error and end the listing.
    #[default]
    Abort,
    /// Log the error and continue with the next entry.
    Skip,
}

/// Options for enumerating the repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListOptions {
    /// Sort entry names instead of keeping directory order.
    pub sorted: bool,
    /// Handling of entries that fail to resolve.
    pub on_error: ListErrorPolicy,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            sorted: true,
            on_error: ListErrorPolicy::Abort,
        }
    }
}

impl Catalog {
    /// Enumerate every dataset directly under the repository root.
    ///
    /// Entry names are read once, here; each [`DatasetInfo`] is resolved
    /// only when the returned [`Listing`] is advanced.
    pub fn list_all(&self) -> Result<Listing, CatalogError> {
        let options = self.list_options();
        let names = self.repository().entry_names(options.sorted)?;
        tracing::debug!(entries = names.len(), "listing repository");

        Ok(Listing {
            catalog: self.clone(),
            names: names.into_iter(),
            on_error: options.on_error,
            finished: false,
        })
    }
}

/// Lazy, single-pass sequence of resolved datasets.
#[derive(Debug)]
pub struct Listing {
    catalog: Catalog,
    names: std::vec::IntoIter<OsString>,
    on_error: ListErrorPolicy,
    finished: bool,
}

impl Listing {
    fn resolve_name(&self, name: OsString) -> Result<DatasetInfo, CatalogError> {
        let raw = name.into_string().map_err(|raw| CatalogError::InvalidId {
            id: raw.to_string_lossy().into_owned(),
            message: "entry name is not valid UTF-8".to_string(),
        })?;
        let id = DatasetId::new(raw)?;
        self.catalog.resolve(&id)
    }
}

impl Iterator for Listing {
    type Item = Result<DatasetInfo, CatalogError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let Some(name) = self.names.next() else {
                self.finished = true;
                return None;
            };

            match self.resolve_name(name) {
                Ok(info) => return Some(Ok(info)),
                Err(error) => match self.on_error {
                    ListErrorPolicy::Abort => {
                        self.finished = true;
                        return Some(Err(error));
                    }
                    ListErrorPolicy::Skip => {
                        tracing::warn!(%error, "skipping dataset that failed to resolve");
                    }
                },
            }
        }
    }
}
