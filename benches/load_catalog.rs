//! Loading benchmarks: parsing the built-in corpus, and walking a large
//! content directory on disk.

#![allow(missing_docs)]

use std::path::Path;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use primer::{Check, Directory, corpus};
use tempfile::TempDir;

/// Writes `copies` renamed copies of every built-in record.
fn preseed_directory(path: &Path, copies: usize) {
    let records = corpus::load_all().unwrap();
    for i in 0..copies {
        for record in &records {
            let mut record = record.clone();
            record.id = format!("{}-{i}", record.id).parse().unwrap();
            record.cross_references.clear();
            let file = path.join(format!("{}.yaml", record.id));
            std::fs::write(file, record.to_yaml().unwrap()).unwrap();
        }
    }
}

fn built_in_corpus(c: &mut Criterion) {
    c.bench_function("built-in catalog", |b| {
        b.iter(|| corpus::catalog().unwrap());
    });
}

fn load_directory(c: &mut Criterion) {
    let tmp_dir = TempDir::new().unwrap();
    preseed_directory(tmp_dir.path(), 100);

    c.bench_function("load directory", |b| {
        b.iter(|| {
            Directory::new(tmp_dir.path().to_path_buf())
                .load_all()
                .unwrap()
        });
    });

    c.bench_function("validate directory", |b| {
        b.iter_batched(
            || {
                Directory::new(tmp_dir.path().to_path_buf())
                    .load_all()
                    .unwrap()
            },
            |directory| directory.validate(&Check::CATALOG),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, built_in_corpus, load_directory);
criterion_main!(benches);
