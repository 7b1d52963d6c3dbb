use arrow_flight::flight_descriptor::DescriptorType;
use arrow_flight::FlightDescriptor;

use crate::error::CatalogError;

use super::ids::{decode, encode};
use super::DatasetId;

/// Client-side reference to a dataset, in path or command form.
///
/// Both forms name the same [`DatasetId`]; they only differ in how the
/// identifier travels inside a Flight descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetDescriptor {
    /// The identifier as a single path segment.
    Path(DatasetId),
    /// The identifier as an opaque command payload.
    Command(DatasetId),
}

impl DatasetDescriptor {
    /// The identifier this descriptor names.
    pub fn id(&self) -> &DatasetId {
        match self {
            DatasetDescriptor::Path(id) | DatasetDescriptor::Command(id) => id,
        }
    }

    /// Convert to the Flight wire descriptor.
    pub fn to_flight(&self) -> FlightDescriptor {
        match self {
            DatasetDescriptor::Path(id) => FlightDescriptor::new_path(vec![id.to_string()]),
            DatasetDescriptor::Command(id) => FlightDescriptor::new_cmd(encode(id)),
        }
    }
}

impl TryFrom<&FlightDescriptor> for DatasetDescriptor {
    type Error = CatalogError;

    /// Multi-segment paths are joined with `/`. Descriptors of unknown type
    /// fall back to whichever of path or command is populated.
    fn try_from(descriptor: &FlightDescriptor) -> Result<Self, Self::Error> {
        match descriptor.r#type() {
            DescriptorType::Path => path_form(&descriptor.path),
            DescriptorType::Cmd => command_form(&descriptor.cmd),
            DescriptorType::Unknown if !descriptor.path.is_empty() => path_form(&descriptor.path),
            DescriptorType::Unknown if !descriptor.cmd.is_empty() => command_form(&descriptor.cmd),
            DescriptorType::Unknown => Err(CatalogError::InvalidDescriptor(
                "descriptor carries neither a path nor a command".to_string(),
            )),
        }
    }
}

fn path_form(segments: &[String]) -> Result<DatasetDescriptor, CatalogError> {
    if segments.is_empty() {
        return Err(CatalogError::InvalidDescriptor(
            "path descriptor has no segments".to_string(),
        ));
    }

    DatasetId::new(segments.join("/"))
        .map(DatasetDescriptor::Path)
        .map_err(|error| CatalogError::InvalidDescriptor(error.to_string()))
}

fn command_form(cmd: &[u8]) -> Result<DatasetDescriptor, CatalogError> {
    decode(cmd)
        .map(DatasetDescriptor::Command)
        .map_err(|error| match error {
            CatalogError::InvalidTicket(message) => CatalogError::InvalidDescriptor(message),
            other => other,
        })
}
