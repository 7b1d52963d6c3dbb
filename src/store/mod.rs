//! Columnar storage access.
//!
//! The catalog never reads files itself. It asks a [`DatasetStore`] for a
//! schema (metadata only) or for a [`BatchCursor`] over the data. Parsing the
//! storage format stays behind this trait; [`ParquetStore`] is the
//! implementation used by the server.

mod cursor;
mod io_parquet;
mod partition;

pub use cursor::BatchCursor;
pub use io_parquet::{ParquetStore, DEFAULT_BATCH_SIZE};
pub use partition::{infer_partition_fields, parse_hive_segments};

use std::path::Path;

use arrow::datatypes::SchemaRef;

use crate::error::CatalogError;

/// How directory names inside a dataset map to columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Partitioning {
    /// Directory names carry no data.
    #[default]
    None,
    /// `key=value` directory names become partition columns.
    Hive,
}

/// Read access to datasets stored at filesystem locations.
pub trait DatasetStore: Send + Sync {
    /// Derive the schema of the dataset at `location` without reading data.
    ///
    /// Must return the same schema that `open_for_read` reports for the same
    /// location and partitioning.
    fn probe_schema(
        &self,
        location: &Path,
        partitioning: Partitioning,
    ) -> Result<SchemaRef, CatalogError>;

    /// Open the dataset at `location` for a full, lazy read.
    fn open_for_read(
        &self,
        location: &Path,
        partitioning: Partitioning,
    ) -> Result<BatchCursor, CatalogError>;
}
