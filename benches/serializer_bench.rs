//! Criterion benchmark untuk Serializer dan ChunkBuilder
//!
//! Run dengan: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serialize::{Chunk, ChunkBuilder, Serializer};

fn bench_pack_unpack(c: &mut Criterion) {
    let mut group = c.benchmark_group("serializer");
    group.throughput(Throughput::Elements(1));

    // Benchmark pack + finalize
    group.bench_function("pack_to_binary", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let mut ser = Serializer::new();
            ser.pack(&black_box(i))
                .and_then(|s| s.pack(&black_box(true)))
                .and_then(|s| s.pack(black_box("payload")))
                .expect("pack failed");
            i = i.wrapping_add(1);
            black_box(ser.to_binary().expect("to_binary failed"))
        });
    });

    // Benchmark from_binary + unpack
    group.bench_function("from_binary_unpack", |b| {
        let mut ser = Serializer::new();
        ser.pack(&42u64)
            .and_then(|s| s.pack(&true))
            .and_then(|s| s.pack("payload"))
            .expect("pack failed");
        let chunk = ser.to_binary().expect("to_binary failed");

        b.iter(|| {
            let mut de = Serializer::new();
            de.from_binary(&chunk).expect("from_binary failed");
            black_box(de.unpack::<u64>().expect("unpack u64"));
            black_box(de.unpack::<bool>().expect("unpack bool"));
            black_box(de.unpack::<String>().expect("unpack string"));
        });
    });

    group.finish();
}

fn bench_combine(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine");

    for fragments in [10, 100, 1000].iter() {
        group.throughput(Throughput::Bytes((*fragments * 64) as u64));
        group.bench_function(format!("fragments_{}", fragments), |b| {
            let fragment = Chunk::new(64).into_ref();
            b.iter(|| {
                let mut builder = ChunkBuilder::new();
                for _ in 0..*fragments {
                    builder.append(fragment.ref_copy());
                }
                black_box(builder.combine())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pack_unpack, bench_combine);
criterion_main!(benches);
