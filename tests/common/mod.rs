#![allow(dead_code)]

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use flightshelf::catalog::{Catalog, Repository};
use flightshelf::store::ParquetStore;
use parquet::arrow::ArrowWriter;

pub const LOCATION: &str = "grpc://localhost:8815";

pub fn write_parquet(path: &Path, batches: &[RecordBatch]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    let file = File::create(path).expect("create parquet file");
    let mut writer = ArrowWriter::try_new(file, batches[0].schema(), None).expect("parquet writer");
    for batch in batches {
        writer.write(batch).expect("write batch");
    }
    writer.close().expect("close writer");
}

pub fn sales_batch(ids: &[i64], amount: f64, region: &str) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("amount", DataType::Float64, false),
        Field::new("region", DataType::Utf8, true),
    ]));
    let amounts: Vec<f64> = ids.iter().map(|_| amount).collect();
    let regions: Vec<&str> = ids.iter().map(|_| region).collect();
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(ids.to_vec())),
            Arc::new(Float64Array::from(amounts)),
            Arc::new(StringArray::from(regions)),
        ],
    )
    .expect("sales batch")
}

/// A `sales` dataset made of two flat files: 3 rows and 2 rows.
pub fn write_sales(root: &Path) {
    write_parquet(
        &root.join("sales/part-0.parquet"),
        &[sales_batch(&[1, 2, 3], 9.5, "north")],
    );
    write_parquet(
        &root.join("sales/part-1.parquet"),
        &[sales_batch(&[4, 5], 12.0, "south")],
    );
}

/// A single-file `weather.parquet` dataset with 4 rows.
pub fn write_weather(root: &Path) {
    write_parquet(
        &root.join("weather.parquet"),
        &[sales_batch(&[10, 11, 12, 13], 0.5, "coast")],
    );
}

pub fn catalog_at(root: &Path) -> Catalog {
    let repository = Repository::open(root).expect("open repository");
    Catalog::new(repository, Arc::new(ParquetStore::default()), LOCATION)
}
