//! Benchmarks for fifokv store and codec operations

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use fifokv::protocol::{encode_response, parse_request, Response};
use fifokv::Store;

fn store_benchmarks(c: &mut Criterion) {
    let value = vec![b'v'; 1024];

    c.bench_function("set_new_key_1k", |b| {
        let store = Store::new(1024 * 1024);
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            store.set(format!("key{}", i), value.clone()).unwrap();
        })
    });

    c.bench_function("set_with_eviction_1k", |b| {
        b.iter_batched(
            || {
                let store = Store::new(64 * 1024);
                for i in 0..64 {
                    store.set(format!("key{}", i), value.clone()).unwrap();
                }
                store
            },
            |store| store.set("incoming", value.clone()).unwrap(),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("get_hit", |b| {
        let store = Store::new(1024 * 1024);
        for i in 0..512 {
            store.set(format!("key{}", i), value.clone()).unwrap();
        }
        b.iter(|| black_box(store.get("key256")))
    });
}

fn codec_benchmarks(c: &mut Criterion) {
    c.bench_function("parse_set_line", |b| {
        b.iter(|| parse_request(black_box(b"set some-key 1024"), 128_000_000))
    });

    let response = Response::value(vec![b'v'; 1024]);
    c.bench_function("encode_value_1k", |b| b.iter(|| encode_response(black_box(&response))));
}

criterion_group!(benches, store_benchmarks, codec_benchmarks);
criterion_main!(benches);
