//! Benchmarks for cell key serialization.
//!
//! Measures the cost of the order-preserving key layout for column names of
//! increasing length, with and without bytes that need escaping.

use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use common::serde::cell_key::CellKey;

/// Component lengths spanning short to long column names
const COMPONENT_LENGTHS: &[usize] = &[4, 16, 64, 256];

fn key_of_len(len: usize, fill: u8) -> CellKey {
    let component = Bytes::from(vec![fill; len]);
    CellKey {
        row: component.clone(),
        family: component.clone(),
        qualifier: component,
        visibility: Bytes::new(),
        timestamp: 1_700_000_000_000,
    }
}

fn bench_cell_key_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("cell_key/serialize");

    for &len in COMPONENT_LENGTHS {
        for (label, fill) in [("plain", b'a'), ("escaped", 0x00)] {
            let key = key_of_len(len, fill);
            group.throughput(Throughput::Elements(1));
            group.bench_with_input(
                BenchmarkId::new(label, format!("{}b", len)),
                &key,
                |b, key| {
                    b.iter(|| black_box(key.serialize()));
                },
            );
        }
    }

    group.finish();
}

fn bench_cell_key_deserialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("cell_key/deserialize");

    for &len in COMPONENT_LENGTHS {
        for (label, fill) in [("plain", b'a'), ("escaped", 0x00)] {
            // Pre-encode the key
            let encoded = key_of_len(len, fill).serialize();

            group.throughput(Throughput::Elements(1));
            group.bench_with_input(
                BenchmarkId::new(label, format!("{}b", len)),
                &encoded,
                |b, encoded| {
                    b.iter(|| {
                        let result = CellKey::deserialize(black_box(encoded)).unwrap();
                        black_box(result)
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(
    cell_key_benches,
    bench_cell_key_serialize,
    bench_cell_key_deserialize,
);

criterion_main!(cell_key_benches);
