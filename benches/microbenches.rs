//! Criterion microbenches for flightshelf resolution and streaming.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - Ticket decoding (decode)
//! - Dataset resolution against a small repository (Catalog::resolve)
//! - Draining a dataset through a cursor (Catalog::open)

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use parquet::arrow::ArrowWriter;
use std::hint::black_box;

use flightshelf::catalog::{decode, Catalog, DatasetId, Repository};
use flightshelf::store::ParquetStore;

const ROWS_PER_FILE: usize = 10_000;

fn write_events(path: &Path, offset: i64) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("kind", DataType::Utf8, true),
    ]));
    let ids: Vec<i64> = (0..ROWS_PER_FILE as i64).map(|i| i + offset).collect();
    let kinds: Vec<&str> = ids
        .iter()
        .map(|id| if id % 2 == 0 { "click" } else { "view" })
        .collect();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(Int64Array::from(ids)), Arc::new(StringArray::from(kinds))],
    )
    .unwrap();

    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut writer = ArrowWriter::try_new(File::create(path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

/// A repository with one hive-partitioned dataset of four files.
fn fixture_catalog(root: &Path) -> Catalog {
    for day in 0..4 {
        write_events(
            &root.join(format!("events/day={day}/part-0.parquet")),
            day * ROWS_PER_FILE as i64,
        );
    }
    let repository = Repository::open(root).unwrap();
    Catalog::new(
        repository,
        Arc::new(ParquetStore::new(4096)),
        "grpc://localhost:8815",
    )
}

/// Benchmark ticket decoding.
fn bench_ticket_decode(c: &mut Criterion) {
    let ticket = b"warehouse/events/2024";
    let mut group = c.benchmark_group("ticket");
    group.throughput(Throughput::Bytes(ticket.len() as u64));

    group.bench_function("decode", |b| {
        b.iter(|| {
            let id = decode(black_box(ticket)).unwrap();
            black_box(id)
        })
    });

    group.finish();
}

/// Benchmark resolution: locate plus footer-only schema probe.
fn bench_resolve(c: &mut Criterion) {
    let temp = tempfile::tempdir().unwrap();
    let catalog = fixture_catalog(temp.path());
    let id = DatasetId::new("events").unwrap();

    c.bench_function("resolve_partitioned", |b| {
        b.iter(|| {
            let info = catalog.resolve(black_box(&id)).unwrap();
            black_box(info)
        })
    });
}

/// Benchmark draining every batch of a dataset.
fn bench_stream(c: &mut Criterion) {
    let temp = tempfile::tempdir().unwrap();
    let catalog = fixture_catalog(temp.path());

    let mut group = c.benchmark_group("stream");
    group.throughput(Throughput::Elements(4 * ROWS_PER_FILE as u64));

    group.bench_function("drain_partitioned", |b| {
        b.iter(|| {
            let rows: usize = catalog
                .open(black_box(b"events"))
                .unwrap()
                .map(|batch| batch.unwrap().num_rows())
                .sum();
            black_box(rows)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_ticket_decode, bench_resolve, bench_stream);
criterion_main!(benches);
