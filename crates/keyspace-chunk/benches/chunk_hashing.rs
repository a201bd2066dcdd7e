use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use keyspace_chunk::{chunk_equals, chunk_hasher, ChunkRef, WritableChunk, DEFAULT_CHUNK_CAPACITY};
use keyspace_math::{PrimitiveKind, Semantics, Traversal, Value, ValueType};

fn doubles(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| match i % 64 {
            0 => f64::NAN,
            1 => -0.0,
            n => n as f64 * 0.5,
        })
        .collect()
}

fn bench_hash_initial(c: &mut Criterion) {
    let values = doubles(DEFAULT_CHUNK_CAPACITY);
    let mut group = c.benchmark_group("hash_initial_f64");
    group.throughput(Throughput::Elements(values.len() as u64));
    for semantics in Semantics::ALL {
        let hasher = chunk_hasher(semantics, ValueType::scalar(PrimitiveKind::Double), Traversal::Shallow)
            .unwrap();
        let mut dest = WritableChunk::with_capacity(values.len());
        group.bench_with_input(BenchmarkId::from_parameter(semantics), &values, |b, values| {
            b.iter(|| {
                hasher
                    .hash_initial(ChunkRef::from(black_box(&values[..])), &mut dest)
                    .unwrap();
                black_box(dest.as_slice());
            })
        });
    }
    group.finish();
}

fn bench_composite_key(c: &mut Criterion) {
    let first = doubles(DEFAULT_CHUNK_CAPACITY);
    let second: Vec<i64> = (0..DEFAULT_CHUNK_CAPACITY as i64).collect();
    let doubles_hasher = chunk_hasher(
        Semantics::Canonical,
        ValueType::scalar(PrimitiveKind::Double),
        Traversal::Shallow,
    )
    .unwrap();
    let longs_hasher = chunk_hasher(
        Semantics::Canonical,
        ValueType::scalar(PrimitiveKind::Long),
        Traversal::Shallow,
    )
    .unwrap();
    let mut dest = WritableChunk::with_capacity(DEFAULT_CHUNK_CAPACITY);

    let mut group = c.benchmark_group("composite_key");
    group.throughput(Throughput::Elements(DEFAULT_CHUNK_CAPACITY as u64));
    group.bench_function("hash_initial_then_update", |b| {
        b.iter(|| {
            doubles_hasher
                .hash_initial(ChunkRef::from(&first[..]), &mut dest)
                .unwrap();
            longs_hasher
                .hash_update(ChunkRef::from(&second[..]), &mut dest)
                .unwrap();
            black_box(dest.as_slice());
        })
    });
    group.finish();
}

fn bench_deep_array_equals(c: &mut Criterion) {
    let ty = ValueType::array(PrimitiveKind::Double, 2);
    let rows: Vec<Value> = (0..1024)
        .map(|i| Value::array([Value::from(vec![i as f64, -0.0]), Value::from(vec![f64::NAN])]))
        .collect();
    let copies: Vec<Value> = (0..1024)
        .map(|i| Value::array([Value::from(vec![i as f64, 0.0]), Value::from(vec![f64::NAN])]))
        .collect();
    let equals = chunk_equals(Semantics::Canonical, ty, Traversal::Deep).unwrap();
    let mut dest = WritableChunk::with_capacity(rows.len());

    c.bench_function("deep_equal_f64_matrix", |b| {
        b.iter(|| {
            equals
                .equal(ChunkRef::from(&rows[..]), ChunkRef::from(&copies[..]), &mut dest)
                .unwrap();
            black_box(dest.as_slice());
        })
    });
}

criterion_group!(
    benches,
    bench_hash_initial,
    bench_composite_key,
    bench_deep_array_equals
);
criterion_main!(benches);
