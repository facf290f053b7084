//! Key and record codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jabcom_bench::{deep_key, sample_record};
use jabcom_codec::{
    decode_key, decode_record, encode_key, encode_record, from_cbor, to_canonical_cbor,
    CanonicalEncoder, Value,
};
use std::collections::BTreeMap;

/// Create a simple map value.
fn simple_map() -> Value {
    Value::Map(BTreeMap::from([
        ("name".to_string(), Value::Text("Alice".into())),
        ("email".to_string(), Value::Text("alice@example.com".into())),
        ("age".to_string(), Value::Integer(30)),
    ]))
}

/// Benchmark key string encoding and decoding by depth.
fn bench_key_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_codec");

    for depth in [1, 4, 16].iter() {
        let key = deep_key(*depth);
        let encoded = encode_key(&key);

        group.bench_with_input(BenchmarkId::new("encode", depth), &key, |b, key| {
            b.iter(|| black_box(encode_key(black_box(key))));
        });
        group.bench_with_input(BenchmarkId::new("decode", depth), &encoded, |b, encoded| {
            b.iter(|| black_box(decode_key(black_box(encoded)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark value encoding.
fn bench_encode_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_value");

    group.bench_function("integer", |b| {
        let value = Value::Integer(42);
        b.iter(|| black_box(to_canonical_cbor(black_box(&value)).unwrap()));
    });

    group.bench_function("map_simple", |b| {
        let value = simple_map();
        b.iter(|| black_box(to_canonical_cbor(black_box(&value)).unwrap()));
    });

    group.bench_function("key", |b| {
        let value = Value::Key(deep_key(4));
        b.iter(|| black_box(to_canonical_cbor(black_box(&value)).unwrap()));
    });

    for size in [256, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("bytes", size), size, |b, &size| {
            let value = Value::Bytes(vec![0u8; size]);
            b.iter(|| black_box(to_canonical_cbor(black_box(&value)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark value decoding.
fn bench_decode_value(c: &mut Criterion) {
    c.bench_function("decode_value/map_simple", |b| {
        let encoded = to_canonical_cbor(&simple_map()).unwrap();
        b.iter(|| black_box(from_cbor(black_box(&encoded)).unwrap()));
    });
}

/// Benchmark record encoding and decoding by field count.
fn bench_record_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_codec");

    for fields in [1, 8, 32].iter() {
        let record = sample_record(deep_key(2), *fields, 32);
        let encoded = encode_record(&record).unwrap();
        group.throughput(Throughput::Bytes(encoded.len() as u64));

        group.bench_with_input(BenchmarkId::new("encode", fields), &record, |b, record| {
            b.iter(|| black_box(encode_record(black_box(record)).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("decode", fields), &encoded, |b, encoded| {
            b.iter(|| black_box(decode_record(black_box(encoded)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark encoder reuse.
fn bench_encoder_reuse(c: &mut Criterion) {
    c.bench_function("encoder_reuse_100", |b| {
        let values: Vec<_> = (0..100).map(Value::Integer).collect();

        b.iter(|| {
            let mut encoder = CanonicalEncoder::new();
            for value in &values {
                encoder.encode(black_box(value)).unwrap();
            }
            black_box(encoder.into_bytes());
        });
    });
}

criterion_group!(
    benches,
    bench_key_codec,
    bench_encode_value,
    bench_decode_value,
    bench_record_codec,
    bench_encoder_reuse,
);

criterion_main!(benches);
