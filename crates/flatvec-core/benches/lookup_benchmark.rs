//! Benchmarks for store lookups and enumeration.
//!
//! Run with: `cargo bench -p flatvec-core`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flatvec_core::{
    CloseableVectorStore, ObjectVectorPair, StoreHeader, Vector, VectorStore, VectorStoreReader,
    VectorStoreWriter, VectorType,
};
use rand::{Rng, SeedableRng};

const DIMENSION: usize = 200;

fn build_store(dir: &std::path::Path, n: usize) -> (VectorStoreReader, Vec<String>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let pairs: Vec<ObjectVectorPair> = (0..n)
        .map(|i| {
            let values = (0..DIMENSION).map(|_| rng.gen_range(-1.0..1.0)).collect();
            ObjectVectorPair::new(format!("term{i}"), Vector::Real(values))
        })
        .collect();
    let ids = pairs.iter().map(|p| p.identifier.clone()).collect();

    let path = dir.join(format!("bench_{n}.bin"));
    let header = StoreHeader::new(VectorType::Real, DIMENSION).expect("header");
    VectorStoreWriter::new()
        .without_disk_guard()
        .write_binary(&path, &header, &pairs)
        .expect("write");
    (VectorStoreReader::open(&path).expect("open"), ids)
}

fn bench_lookup(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut group = c.benchmark_group("lookup");

    for n in [1_000, 10_000] {
        let (reader, ids) = build_store(dir.path(), n);
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);

        group.bench_with_input(BenchmarkId::new("offset_index", n), &n, |b, _| {
            b.iter(|| {
                let id = &ids[rng.gen_range(0..ids.len())];
                black_box(reader.lookup(id).expect("lookup"))
            });
        });

        group.bench_with_input(BenchmarkId::new("linear_scan", n), &n, |b, _| {
            b.iter(|| {
                let id = &ids[rng.gen_range(0..ids.len())];
                black_box(reader.scan_for(id).expect("scan"))
            });
        });
    }
    group.finish();
}

fn bench_enumerate(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let (reader, _) = build_store(dir.path(), 10_000);

    c.bench_function("enumerate_10k_200d", |b| {
        b.iter(|| black_box(reader.count().expect("count")));
    });
}

criterion_group!(benches, bench_lookup, bench_enumerate);
criterion_main!(benches);
