//! Dataset identifiers and their ticket encoding.
//!
//! A [`DatasetId`] is the string clients use to name a dataset. It is
//! interpreted as a path relative to the repository root; `/` separates
//! hierarchy levels. Tickets and command descriptors carry the identifier as
//! plain UTF-8 bytes with no further framing.

use std::fmt;

use bytes::Bytes;

use crate::error::CatalogError;

/// Name of a dataset relative to the repository root.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetId(String);

impl DatasetId {
    /// Creates a new DatasetId, rejecting empty names and control characters.
    pub fn new(raw: impl Into<String>) -> Result<Self, CatalogError> {
        let raw = raw.into();
        if let Some(message) = invalid_reason(&raw) {
            return Err(CatalogError::InvalidId { id: raw, message });
        }
        Ok(Self(raw))
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid_reason(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return Some("identifier is empty".to_string());
    }
    if let Some(ch) = raw.chars().find(|ch| ch.is_control()) {
        return Some(format!("contains control character {:?}", ch));
    }
    None
}

impl fmt::Debug for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatasetId({:?})", self.0)
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode an identifier into ticket bytes.
pub fn encode(id: &DatasetId) -> Bytes {
    Bytes::copy_from_slice(id.as_str().as_bytes())
}

/// Decode ticket bytes back into an identifier.
pub fn decode(bytes: &[u8]) -> Result<DatasetId, CatalogError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|source| CatalogError::InvalidTicket(format!("not valid UTF-8: {source}")))?;

    DatasetId::new(text).map_err(|error| match error {
        CatalogError::InvalidId { id, message } => {
            CatalogError::InvalidTicket(format!("'{}': {}", id.escape_debug(), message))
        }
        other => other,
    })
}
