//! Printable summaries of resolved datasets.
//!
//! Used by the `list` and `info` commands for both text and JSON output.

use std::fmt;

use serde::Serialize;

use crate::catalog::DatasetInfo;

/// One column of a dataset schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

/// Everything a client needs to know about one dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub dataset: String,
    pub ticket: String,
    pub locations: Vec<String>,
    pub columns: Vec<ColumnSummary>,
}

impl From<&DatasetInfo> for DatasetSummary {
    fn from(info: &DatasetInfo) -> Self {
        let columns = info
            .schema
            .fields()
            .iter()
            .map(|field| ColumnSummary {
                name: field.name().clone(),
                data_type: field.data_type().to_string(),
                nullable: field.is_nullable(),
            })
            .collect();

        let (ticket, locations) = info
            .endpoints
            .first()
            .map(|endpoint| {
                (
                    String::from_utf8_lossy(&endpoint.ticket).into_owned(),
                    endpoint.locations.clone(),
                )
            })
            .unwrap_or_default();

        Self {
            dataset: info.id.to_string(),
            ticket,
            locations,
            columns,
        }
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.dataset)?;
        writeln!(f, "  ticket: {}", self.ticket)?;
        for location in &self.locations {
            writeln!(f, "  location: {}", location)?;
        }
        writeln!(f, "  columns:")?;
        for column in &self.columns {
            let nullability = if column.nullable { "nullable" } else { "not null" };
            writeln!(
                f,
                "    {}: {} ({})",
                column.name, column.data_type, nullability
            )?;
        }
        Ok(())
    }
}
