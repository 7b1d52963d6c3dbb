//! Ticket streaming: from ticket bytes to a pull-driven batch stream.
//!
//! [`Catalog::open`] does the synchronous part (decode, locate, open through
//! the store). [`pull_blocking`] turns the resulting cursor, or any other
//! fallible iterator, into an async stream for the transport. Each poll moves
//! the iterator onto the blocking pool for exactly one `next()` call, so
//! nothing is read ahead of demand and a slow consumer only holds up its own
//! stream.

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use futures::stream::{self, BoxStream, StreamExt};

use crate::catalog::{attribute_to, decode, Catalog};
use crate::error::CatalogError;
use crate::store::BatchCursor;

/// Outbound stream of record batches for one ticket.
pub type BatchStream = BoxStream<'static, Result<RecordBatch, CatalogError>>;

impl Catalog {
    /// Open the dataset a ticket names for a full read.
    ///
    /// The returned cursor reports the schema its batches conform to.
    pub fn open(&self, ticket: &[u8]) -> Result<BatchCursor, CatalogError> {
        let id = decode(ticket)?;
        let location = self.locate(&id)?;
        let cursor = self
            .store()
            .open_for_read(&location, self.partitioning())
            .map_err(|error| attribute_to(error, &id))?;

        tracing::debug!(dataset = %id, "opened dataset for streaming");
        Ok(cursor)
    }

    /// Open a ticket and adapt it for async consumption.
    pub fn open_stream(&self, ticket: &[u8]) -> Result<(SchemaRef, BatchStream), CatalogError> {
        let cursor = self.open(ticket)?;
        let schema = cursor.schema();
        Ok((schema, pull_blocking(cursor)))
    }
}

/// Drive a blocking, fallible iterator one item per poll.
///
/// The iterator is dropped as soon as it is exhausted, after the first error,
/// or when the stream itself is dropped.
pub fn pull_blocking<I, T>(iter: I) -> BoxStream<'static, Result<T, CatalogError>>
where
    I: Iterator<Item = Result<T, CatalogError>> + Send + 'static,
    T: Send + 'static,
{
    stream::unfold(Some(iter), |state| async move {
        let mut iter = state?;
        let pulled = tokio::task::spawn_blocking(move || {
            let item = iter.next();
            (item, iter)
        })
        .await;

        match pulled {
            Ok((Some(Ok(item)), iter)) => Some((Ok(item), Some(iter))),
            Ok((Some(Err(error)), _)) => Some((Err(error), None)),
            Ok((None, _)) => None,
            Err(join_error) => Some((
                Err(CatalogError::Io(std::io::Error::other(format!(
                    "blocking read task failed: {join_error}"
                )))),
                None,
            )),
        }
    })
    .boxed()
}
