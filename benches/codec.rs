use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_xdl::{decode_json, decode_xdl, encode_json, encode_xdl, from_str, to_string, Var};

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

fn products(size: usize) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            sku: format!("SKU-{:04}", i),
            name: format!("Product {}", i),
            price: 9.99 + i as f64,
            quantity: (i % 17) as u32,
        })
        .collect()
}

fn benchmark_decode_xdl(c: &mut Criterion) {
    let input = "// scene\nScene{camera=Cam{fov=60.5,pos=[0,1.5,-3]},\
                 lights=[Light{on=Y,color=\"warm\"},Light{on=N,color=\"cold\"}],\
                 /* flags */ flags={shadows=Y,bloom=N,exposure=1.25e+0}}";

    c.bench_function("decode_xdl_document", |b| {
        b.iter(|| decode_xdl(black_box(input)))
    });
}

fn benchmark_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [10, 100, 1000].iter() {
        let value = serde_xdl::to_value(&products(*size)).unwrap_or_default();

        group.bench_with_input(BenchmarkId::new("xdl", size), &value, |b, v| {
            b.iter(|| encode_xdl(black_box(v)))
        });
        group.bench_with_input(BenchmarkId::new("json", size), &value, |b, v| {
            b.iter(|| encode_json(black_box(v)))
        });
    }

    group.finish();
}

fn benchmark_decode_json_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_json_array");

    for size in [10, 100, 1000].iter() {
        let value = serde_xdl::to_value(&products(*size)).unwrap_or_default();
        let text = encode_json(&value).unwrap_or_default();

        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, t| {
            b.iter(|| decode_json(black_box(t)))
        });
    }

    group.finish();
}

fn benchmark_typed_roundtrip(c: &mut Criterion) {
    let data = products(100);
    let text = to_string(&data).unwrap_or_default();

    c.bench_function("to_string_products_100", |b| {
        b.iter(|| to_string(black_box(&data)))
    });
    c.bench_function("from_str_products_100", |b| {
        b.iter(|| from_str::<Vec<Product>>(black_box(&text)))
    });
}

fn benchmark_deep_clone(c: &mut Criterion) {
    let value = serde_xdl::to_value(&products(100)).unwrap_or_default();

    c.bench_function("deep_clone_products_100", |b| {
        b.iter(|| Var::deep_clone(black_box(&value)))
    });
}

criterion_group!(
    benches,
    benchmark_decode_xdl,
    benchmark_encode,
    benchmark_decode_json_array,
    benchmark_typed_roundtrip,
    benchmark_deep_clone
);
criterion_main!(benches);
