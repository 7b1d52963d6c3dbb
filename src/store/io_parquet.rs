//! Parquet dataset store.
//!
//! A dataset location is either a single Parquet file or a directory tree of
//! Parquet files. Directory trees are read in sorted path order; entries
//! whose name starts with `.` or `_` (for example `_SUCCESS` markers) are
//! skipped. Schemas come from file footers only, so probing never touches
//! row data.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{new_null_array, ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};

use crate::catalog::is_hidden_name;
use crate::error::CatalogError;

use super::partition::{infer_partition_fields, parse_hive_segments};
use super::{BatchCursor, DatasetStore, Partitioning};

/// Rows per batch when no explicit size is configured.
pub const DEFAULT_BATCH_SIZE: usize = 65_536;

/// [`DatasetStore`] reading Parquet files from the local filesystem.
#[derive(Clone, Debug)]
pub struct ParquetStore {
    batch_size: usize,
}

impl Default for ParquetStore {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl ParquetStore {
    /// Creates a store that reads at most `batch_size` rows per batch.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Maximum rows per yielded batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl DatasetStore for ParquetStore {
    fn probe_schema(
        &self,
        location: &Path,
        partitioning: Partitioning,
    ) -> Result<SchemaRef, CatalogError> {
        Ok(plan_dataset(location, partitioning)?.schema)
    }

    fn open_for_read(
        &self,
        location: &Path,
        partitioning: Partitioning,
    ) -> Result<BatchCursor, CatalogError> {
        let plan = plan_dataset(location, partitioning)?;
        tracing::debug!(
            location = %location.display(),
            files = plan.files.len(),
            "opening parquet dataset"
        );

        let batches = ParquetBatches {
            schema: plan.schema.clone(),
            partition_keys: plan.partition_keys,
            files: plan.files.into_iter(),
            current: None,
            batch_size: self.batch_size,
        };
        Ok(BatchCursor::new(plan.schema, batches))
    }
}

/// One data file plus the partition values its directory path encodes.
#[derive(Clone, Debug)]
struct DataFile {
    path: PathBuf,
    partitions: Vec<(String, Option<String>)>,
}

/// The files of a dataset and the schema their batches are projected to.
#[derive(Debug)]
struct DatasetPlan {
    files: Vec<DataFile>,
    schema: SchemaRef,
    /// Columns filled from directory values rather than file data.
    partition_keys: Vec<String>,
}

fn plan_dataset(location: &Path, partitioning: Partitioning) -> Result<DatasetPlan, CatalogError> {
    let paths = discover_data_files(location)?;

    let files: Vec<DataFile> = paths
        .into_iter()
        .map(|path| {
            let partitions = match partitioning {
                Partitioning::Hive => {
                    parse_hive_segments(path.strip_prefix(location).unwrap_or(&path))
                }
                Partitioning::None => Vec::new(),
            };
            DataFile { path, partitions }
        })
        .collect();

    let file_schemas = files
        .iter()
        .map(|file| read_file_schema(&file.path))
        .collect::<Result<Vec<_>, _>>()?;
    let mut fields = merge_file_schemas(location, &file_schemas)?;

    let partition_fields = infer_partition_fields(files.iter().map(|file| file.partitions.as_slice()));
    let mut partition_keys = Vec::new();
    for field in partition_fields {
        // A real column wins over a directory name with the same key; files
        // lacking that column get nulls, never the directory value.
        if fields.iter().all(|existing| existing.name() != field.name()) {
            partition_keys.push(field.name().clone());
            fields.push(field);
        }
    }

    Ok(DatasetPlan {
        files,
        schema: Arc::new(Schema::new(fields)),
        partition_keys,
    })
}

fn discover_data_files(location: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    if location.is_file() {
        return Ok(vec![location.to_path_buf()]);
    }

    if !location.is_dir() {
        return Err(CatalogError::NotFound {
            id: location.display().to_string(),
        });
    }

    let mut files = Vec::new();
    let walker = walkdir::WalkDir::new(location)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .map(is_hidden_name)
                    .unwrap_or(false)
        });

    for entry in walker {
        let entry = entry.map_err(|source| CatalogError::Io(source.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let is_parquet = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                ext.eq_ignore_ascii_case("parquet")
                    || ext.eq_ignore_ascii_case("parq")
                    || ext.eq_ignore_ascii_case("pq")
            })
            .unwrap_or(false);
        if is_parquet {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(CatalogError::NotFound {
            id: location.display().to_string(),
        });
    }

    Ok(files)
}

fn read_file_schema(path: &Path) -> Result<SchemaRef, CatalogError> {
    let file = File::open(path)?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|source| CatalogError::Schema {
            path: path.to_path_buf(),
            message: source.to_string(),
        })?;
    Ok(builder.schema().clone())
}

/// Merge per-file schemas into the dataset schema.
///
/// Schema-level metadata is dropped so that writer-specific key/value pairs
/// cannot make otherwise identical files conflict. Columns missing from at
/// least one file become nullable.
fn merge_file_schemas(location: &Path, schemas: &[SchemaRef]) -> Result<Vec<Field>, CatalogError> {
    let bare = schemas
        .iter()
        .map(|schema| Schema::new(schema.fields().clone()));
    let merged = Schema::try_merge(bare).map_err(|source| CatalogError::Schema {
        path: location.to_path_buf(),
        message: format!("incompatible file schemas: {source}"),
    })?;

    Ok(merged
        .fields()
        .iter()
        .map(|field| {
            let everywhere = schemas
                .iter()
                .all(|schema| schema.field_with_name(field.name()).is_ok());
            field.as_ref().clone().with_nullable(field.is_nullable() || !everywhere)
        })
        .collect())
}

fn open_reader(path: &Path, batch_size: usize) -> Result<ParquetRecordBatchReader, CatalogError> {
    let file = File::open(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;

    ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|source| CatalogError::Schema {
            path: path.to_path_buf(),
            message: source.to_string(),
        })?
        .with_batch_size(batch_size)
        .build()
        .map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            message: source.to_string(),
        })
}

/// Lazily walks the dataset files, holding at most one open reader.
struct ParquetBatches {
    schema: SchemaRef,
    partition_keys: Vec<String>,
    files: std::vec::IntoIter<DataFile>,
    current: Option<(ParquetRecordBatchReader, DataFile)>,
    batch_size: usize,
}

impl Iterator for ParquetBatches {
    type Item = Result<RecordBatch, CatalogError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((reader, file)) = self.current.as_mut() {
                match reader.next() {
                    Some(Ok(batch)) => {
                        return Some(project_batch(
                            &self.schema,
                            &self.partition_keys,
                            batch,
                            file,
                        ))
                    }
                    Some(Err(source)) => {
                        return Some(Err(CatalogError::Read {
                            path: file.path.clone(),
                            message: source.to_string(),
                        }))
                    }
                    None => self.current = None,
                }
            }

            let file = self.files.next()?;
            match open_reader(&file.path, self.batch_size) {
                Ok(reader) => self.current = Some((reader, file)),
                Err(error) => return Some(Err(error)),
            }
        }
    }
}

/// Align a file batch with the dataset schema.
fn project_batch(
    schema: &SchemaRef,
    partition_keys: &[String],
    batch: RecordBatch,
    file: &DataFile,
) -> Result<RecordBatch, CatalogError> {
    let rows = batch.num_rows();
    let batch_schema = batch.schema();

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let column = match batch_schema.index_of(field.name()) {
            Ok(index) => batch.column(index).clone(),
            Err(_) if partition_keys.contains(field.name()) => {
                match file.partitions.iter().find(|(key, _)| key == field.name()) {
                    Some((_, Some(value))) => partition_column(field, value, rows, &file.path)?,
                    _ => new_null_array(field.data_type(), rows),
                }
            }
            Err(_) => new_null_array(field.data_type(), rows),
        };
        columns.push(column);
    }

    RecordBatch::try_new_with_options(
        schema.clone(),
        columns,
        &RecordBatchOptions::new().with_row_count(Some(rows)),
    )
    .map_err(|source| CatalogError::Read {
        path: file.path.clone(),
        message: source.to_string(),
    })
}

fn partition_column(
    field: &Field,
    value: &str,
    rows: usize,
    path: &Path,
) -> Result<ArrayRef, CatalogError> {
    match field.data_type() {
        DataType::Int64 => {
            let parsed = value.parse::<i64>().map_err(|source| CatalogError::Schema {
                path: path.to_path_buf(),
                message: format!("partition {}={}: {}", field.name(), value, source),
            })?;
            Ok(Arc::new(Int64Array::from(vec![parsed; rows])))
        }
        _ => Ok(Arc::new(StringArray::from(vec![value; rows]))),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use arrow::array::{Array, AsArray};
    use arrow::datatypes::Int64Type;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_parquet(path: &Path, batches: &[RecordBatch]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        let file = File::create(path).expect("create parquet file");
        let mut writer =
            ArrowWriter::try_new(file, batches[0].schema(), None).expect("parquet writer");
        for batch in batches {
            writer.write(batch).expect("write batch");
        }
        writer.close().expect("close writer");
    }

    fn ids_batch(ids: &[i64]) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(ids.to_vec()))])
            .expect("ids batch")
    }

    fn named_batch(name: &str, ids: &[i64]) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("name", DataType::Utf8, true),
        ]));
        let names: Vec<&str> = ids.iter().map(|_| name).collect();
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(ids.to_vec())),
                Arc::new(StringArray::from(names)),
            ],
        )
        .expect("named batch")
    }

    fn collect_ids(cursor: BatchCursor) -> Vec<i64> {
        cursor
            .map(|batch| batch.expect("batch"))
            .flat_map(|batch| {
                batch
                    .column(0)
                    .as_primitive::<Int64Type>()
                    .values()
                    .to_vec()
            })
            .collect()
    }

    #[test]
    fn single_file_dataset() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("numbers.parquet");
        write_parquet(&path, &[ids_batch(&[1, 2, 3])]);

        let store = ParquetStore::default();
        let schema = store.probe_schema(&path, Partitioning::Hive).expect("probe");
        assert_eq!(schema.fields().len(), 1);

        let cursor = store.open_for_read(&path, Partitioning::Hive).expect("open");
        assert_eq!(collect_ids(cursor), vec![1, 2, 3]);
    }

    #[test]
    fn hive_directories_become_columns() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("sales");
        write_parquet(&root.join("year=2023/part-0.parquet"), &[ids_batch(&[1, 2])]);
        write_parquet(&root.join("year=2024/part-0.parquet"), &[ids_batch(&[3])]);

        let store = ParquetStore::default();
        let schema = store.probe_schema(&root, Partitioning::Hive).expect("probe");
        let year = schema.field_with_name("year").expect("year column");
        assert_eq!(year.data_type(), &DataType::Int64);

        let cursor = store.open_for_read(&root, Partitioning::Hive).expect("open");
        assert_eq!(cursor.schema(), schema);
        let batches: Vec<RecordBatch> = cursor.map(|b| b.expect("batch")).collect();
        assert_eq!(batches.len(), 2);

        let years: Vec<i64> = batches
            .iter()
            .flat_map(|batch| {
                batch
                    .column_by_name("year")
                    .expect("year")
                    .as_primitive::<Int64Type>()
                    .values()
                    .to_vec()
            })
            .collect();
        assert_eq!(years, vec![2023, 2023, 2024]);
    }

    #[test]
    fn without_partitioning_directories_are_plain() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("sales");
        write_parquet(&root.join("year=2023/part-0.parquet"), &[ids_batch(&[1])]);

        let schema = ParquetStore::default()
            .probe_schema(&root, Partitioning::None)
            .expect("probe");
        assert!(schema.field_with_name("year").is_err());
    }

    #[test]
    fn missing_columns_are_null_filled() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("people");
        write_parquet(&root.join("a.parquet"), &[ids_batch(&[1])]);
        write_parquet(&root.join("b.parquet"), &[named_batch("bo", &[2])]);

        let store = ParquetStore::default();
        let cursor = store.open_for_read(&root, Partitioning::Hive).expect("open");
        let schema = cursor.schema();
        assert!(schema.field_with_name("name").expect("name").is_nullable());

        let batches: Vec<RecordBatch> = cursor.map(|b| b.expect("batch")).collect();
        assert_eq!(batches[0].column_by_name("name").expect("name").null_count(), 1);
        assert_eq!(batches[1].column_by_name("name").expect("name").null_count(), 0);
    }

    #[test]
    fn markers_and_hidden_files_are_skipped() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("sales");
        write_parquet(&root.join("part-0.parquet"), &[ids_batch(&[7])]);
        fs::write(root.join("_SUCCESS"), b"").expect("marker");
        fs::write(root.join(".part-0.parquet.crc"), b"crc").expect("crc");
        fs::create_dir_all(root.join("_temporary")).expect("temp dir");
        fs::write(root.join("_temporary/junk.parquet"), b"junk").expect("junk");

        let cursor = ParquetStore::default()
            .open_for_read(&root, Partitioning::Hive)
            .expect("open");
        assert_eq!(collect_ids(cursor), vec![7]);
    }

    #[test]
    fn small_batch_size_splits_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("numbers.parquet");
        write_parquet(&path, &[ids_batch(&[1, 2, 3, 4, 5])]);

        let cursor = ParquetStore::new(2)
            .open_for_read(&path, Partitioning::Hive)
            .expect("open");
        let sizes: Vec<usize> = cursor.map(|b| b.expect("batch").num_rows()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn corrupt_file_is_a_schema_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("broken.parquet");
        fs::write(&path, b"definitely not parquet").expect("write junk");

        let err = ParquetStore::default()
            .probe_schema(&path, Partitioning::Hive)
            .expect_err("corrupt footer");
        assert!(matches!(err, CatalogError::Schema { .. }));
    }

    #[test]
    fn conflicting_column_types_are_a_schema_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("mixed");
        write_parquet(&root.join("a.parquet"), &[ids_batch(&[1])]);
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Utf8, false)]));
        let text = RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(vec!["x"]))])
            .expect("text batch");
        write_parquet(&root.join("b.parquet"), &[text]);

        let err = ParquetStore::default()
            .probe_schema(&root, Partitioning::Hive)
            .expect_err("conflicting types");
        match err {
            CatalogError::Schema { message, .. } => assert!(message.contains("incompatible")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn file_column_wins_over_partition_key() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("ds");
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("year", DataType::Int32, false),
        ]));
        let with_year = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1])),
                Arc::new(arrow::array::Int32Array::from(vec![1999])),
            ],
        )
        .expect("year batch");
        write_parquet(&root.join("a.parquet"), &[with_year]);
        write_parquet(&root.join("year=2024/b.parquet"), &[ids_batch(&[2, 3])]);

        let store = ParquetStore::default();
        let schema = store.probe_schema(&root, Partitioning::Hive).expect("probe");
        let year = schema.field_with_name("year").expect("year column");
        assert_eq!(year.data_type(), &DataType::Int32);
        assert!(year.is_nullable());

        let cursor = store.open_for_read(&root, Partitioning::Hive).expect("open");
        assert_eq!(cursor.schema(), schema);
        let batches: Vec<RecordBatch> = cursor.map(|b| b.expect("batch")).collect();
        assert_eq!(batches.len(), 2);
        for batch in &batches {
            assert_eq!(batch.schema(), schema);
        }
        let from_directory = batches[1].column_by_name("year").expect("year");
        assert_eq!(from_directory.null_count(), 2);
    }

    #[test]
    fn directory_without_parquet_is_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("notes");
        fs::create_dir_all(&root).expect("create dir");
        fs::write(root.join("README.txt"), b"hello").expect("write readme");

        let err = ParquetStore::default()
            .probe_schema(&root, Partitioning::Hive)
            .expect_err("no data files");
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }
}
