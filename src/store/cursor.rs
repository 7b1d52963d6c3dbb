use std::fmt;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use crate::error::CatalogError;

type BatchIter = Box<dyn Iterator<Item = Result<RecordBatch, CatalogError>> + Send>;

/// Single-pass cursor over the record batches of one opened dataset.
///
/// The cursor owns whatever storage handles the producing iterator holds.
/// They are released by [`BatchCursor::close`], by exhausting the cursor, by
/// the first error, or by dropping it.
pub struct BatchCursor {
    schema: SchemaRef,
    inner: Option<BatchIter>,
}

impl BatchCursor {
    /// Wrap a batch iterator whose items conform to `schema`.
    pub fn new<I>(schema: SchemaRef, batches: I) -> Self
    where
        I: Iterator<Item = Result<RecordBatch, CatalogError>> + Send + 'static,
    {
        Self {
            schema,
            inner: Some(Box::new(batches)),
        }
    }

    /// The schema every yielded batch conforms to.
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// Pull the next batch. `Ok(None)` marks the end of the data.
    pub fn next_batch(&mut self) -> Result<Option<RecordBatch>, CatalogError> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(None);
        };

        match inner.next() {
            Some(Ok(batch)) => Ok(Some(batch)),
            Some(Err(error)) => {
                self.inner = None;
                Err(error)
            }
            None => {
                self.inner = None;
                tracing::debug!("batch cursor exhausted");
                Ok(None)
            }
        }
    }

    /// Returns true once the cursor has released its storage handles.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Release the underlying storage handles without reading further.
    pub fn close(mut self) {
        self.inner = None;
    }
}

impl Iterator for BatchCursor {
    type Item = Result<RecordBatch, CatalogError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}

impl Drop for BatchCursor {
    fn drop(&mut self) {
        if self.inner.take().is_some() {
            tracing::debug!("batch cursor released before the end of the data");
        }
    }
}

impl fmt::Debug for BatchCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchCursor")
            .field("fields", &self.schema.fields().len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
