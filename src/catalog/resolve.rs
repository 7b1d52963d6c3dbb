use std::path::PathBuf;

use crate::error::CatalogError;

use super::ids::encode;
use super::{Catalog, DatasetDescriptor, DatasetId, DatasetInfo, Endpoint, UNKNOWN_COUNT};

impl Catalog {
    /// Resolve an identifier to its schema and a single fetch endpoint.
    ///
    /// Only file footers are read. Record and byte totals are reported as
    /// [`UNKNOWN_COUNT`].
    pub fn resolve(&self, id: &DatasetId) -> Result<DatasetInfo, CatalogError> {
        let location = self.locate(id)?;
        let schema = self
            .store()
            .probe_schema(&location, self.partitioning())
            .map_err(|error| attribute_to(error, id))?;

        tracing::debug!(dataset = %id, fields = schema.fields().len(), "resolved dataset");

        Ok(DatasetInfo {
            id: id.clone(),
            schema,
            descriptor: DatasetDescriptor::Path(id.clone()),
            endpoints: vec![Endpoint {
                ticket: encode(id),
                locations: vec![self.location().to_string()],
            }],
            total_records: UNKNOWN_COUNT,
            total_bytes: UNKNOWN_COUNT,
        })
    }

    /// Resolve whatever identifier a client descriptor names.
    pub fn resolve_descriptor(
        &self,
        descriptor: &DatasetDescriptor,
    ) -> Result<DatasetInfo, CatalogError> {
        self.resolve(descriptor.id())
    }

    /// Map an identifier to its storage location under the root.
    pub fn locate(&self, id: &DatasetId) -> Result<PathBuf, CatalogError> {
        self.repository().locate(id)
    }
}

/// Report store-level "not found" errors against the requested identifier
/// rather than the absolute storage path.
pub(crate) fn attribute_to(error: CatalogError, id: &DatasetId) -> CatalogError {
    match error {
        CatalogError::NotFound { .. } => CatalogError::NotFound { id: id.to_string() },
        other => other,
    }
}
