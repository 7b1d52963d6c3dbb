//! Hive-style partition columns derived from directory names.

use std::path::Path;

use arrow::datatypes::{DataType, Field};
use percent_encoding::percent_decode_str;

/// Directory value that stands for a null partition key.
const HIVE_NULL: &str = "__HIVE_DEFAULT_PARTITION__";

/// Extract `(key, value)` pairs from the directory part of `relative`.
///
/// Only parent directories are considered; the file name itself never
/// contributes a partition value. Values are URI-decoded (`New%20York`
/// becomes `New York`); a value that does not decode to UTF-8 is kept as
/// written. `None` marks a null partition value.
pub fn parse_hive_segments(relative: &Path) -> Vec<(String, Option<String>)> {
    let Some(parent) = relative.parent() else {
        return Vec::new();
    };

    parent
        .components()
        .filter_map(|component| component.as_os_str().to_str())
        .filter_map(|segment| segment.split_once('='))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| {
            let value = (value != HIVE_NULL && !value.is_empty()).then(|| decode_value(value));
            (key.to_string(), value)
        })
        .collect()
}

fn decode_value(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Infer one nullable field per partition key, in first-seen order.
///
/// A key whose non-null values all parse as `i64` becomes `Int64`; anything
/// else is `Utf8`.
pub fn infer_partition_fields<'a, I>(files: I) -> Vec<Field>
where
    I: IntoIterator<Item = &'a [(String, Option<String>)]>,
{
    let mut keys: Vec<(String, bool)> = Vec::new();

    for segments in files {
        for (key, value) in segments {
            let is_integer = value
                .as_deref()
                .map(|text| text.parse::<i64>().is_ok())
                .unwrap_or(true);

            match keys.iter_mut().find(|(existing, _)| existing == key) {
                Some((_, all_integers)) => *all_integers &= is_integer,
                None => keys.push((key.clone(), is_integer)),
            }
        }
    }

    keys.into_iter()
        .map(|(key, all_integers)| {
            let data_type = if all_integers {
                DataType::Int64
            } else {
                DataType::Utf8
            };
            Field::new(key, data_type, true)
        })
        .collect()
}
