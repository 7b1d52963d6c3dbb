use arrow::datatypes::SchemaRef;
use arrow_flight::{FlightEndpoint, FlightInfo, Ticket};
use bytes::Bytes;

use crate::error::CatalogError;

use super::{DatasetDescriptor, DatasetId};

/// Marker for record and byte totals that are not computed.
///
/// Counting would need a full scan, so resolution never does it.
pub const UNKNOWN_COUNT: i64 = -1;

/// Where the data of one dataset can be fetched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// Opaque ticket to pass to DoGet.
    pub ticket: Bytes,
    /// Service locations that accept the ticket.
    pub locations: Vec<String>,
}

/// Metadata describing one resolved dataset.
#[derive(Clone, Debug)]
pub struct DatasetInfo {
    pub id: DatasetId,
    pub schema: SchemaRef,
    pub descriptor: DatasetDescriptor,
    pub endpoints: Vec<Endpoint>,
    pub total_records: i64,
    pub total_bytes: i64,
}

impl DatasetInfo {
    /// Convert to the Flight wire representation.
    pub fn to_flight_info(&self) -> Result<FlightInfo, CatalogError> {
        let mut info = FlightInfo::new()
            .try_with_schema(self.schema.as_ref())
            .map_err(|source| CatalogError::Schema {
                path: self.id.as_str().into(),
                message: format!("schema cannot be IPC encoded: {source}"),
            })?
            .with_descriptor(self.descriptor.to_flight())
            .with_total_records(self.total_records)
            .with_total_bytes(self.total_bytes);

        for endpoint in &self.endpoints {
            let mut flight_endpoint =
                FlightEndpoint::new().with_ticket(Ticket::new(endpoint.ticket.clone()));
            for location in &endpoint.locations {
                flight_endpoint = flight_endpoint.with_location(location.clone());
            }
            info = info.with_endpoint(flight_endpoint);
        }

        Ok(info)
    }
}
