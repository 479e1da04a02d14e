//! Benchmarks for the mapper
//!
//! These benchmarks cover the common paths: same-shape updates, map driven
//! updates with text parsing, and slice copies between declared types.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use shapeshift_core::{normalize, reflect_struct, Mapper, Timestamp};

reflect_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    struct Address {
        street: String,
        city: String,
        zip_code: String,
    }
}

reflect_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    struct Customer {
        id: i64,
        full_name: String,
        email: String,
        active: bool,
        balance: f64,
        created_at: Timestamp,
        address: Address,
        tags: Vec<String>,
    }
}

reflect_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    struct CustomerRow {
        id: String,
        full_name: String,
        email: String,
        active: String,
        balance: String,
        created_at: String,
        address: Address,
    }
}

fn create_customer(i: i64) -> Customer {
    Customer {
        id: i,
        full_name: format!("Customer {}", i),
        email: format!("customer{}@example.com", i),
        active: i % 2 == 0,
        balance: (i as f64) * 1.5 + 10.0,
        created_at: Timestamp::ZERO,
        address: Address {
            street: format!("{} Main Street", i),
            city: "Lisbon".to_string(),
            zip_code: "1000-001".to_string(),
        },
        tags: vec!["tag1".to_string(), "tag2".to_string()],
    }
}

fn create_row(i: i64) -> CustomerRow {
    CustomerRow {
        id: i.to_string(),
        full_name: format!("Row {}", i),
        email: String::new(),
        active: "true".to_string(),
        balance: "12.5".to_string(),
        created_at: "2023-12-12T09:10:11.2341".to_string(),
        address: Address::default(),
    }
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for name in ["id", "full_name", "createdAt", "Some_Long_Field_Name_With_Parts"] {
        group.bench_with_input(BenchmarkId::new("normalize", name), name, |b, name| {
            b.iter(|| black_box(normalize(black_box(name))))
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    let mapper = Mapper::new();
    let edited = create_customer(7);
    let row = create_row(7);

    group.bench_function("same_shape", |b| {
        b.iter(|| {
            let mut target = create_customer(1);
            mapper.update(&mut target, black_box(&edited)).unwrap();
            black_box(target)
        })
    });

    group.bench_function("parsed_text", |b| {
        b.iter(|| {
            let mut target = create_customer(1);
            mapper.update(&mut target, black_box(&row)).unwrap();
            black_box(target)
        })
    });

    group.finish();
}

fn bench_update_via_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_via_json");
    let mapper = Mapper::new();

    let edits = vec![
        ("flat", json!({"fullName": "Edited", "balance": "99.5"})),
        ("nested", json!({"city": "Porto", "zip_code": "4000-001"})),
        ("mixed", json!({"id": 3, "tags": ["a", "b", "c"], "createdAt": "2023-12-12"})),
    ];

    for (name, edit) in edits {
        group.bench_with_input(BenchmarkId::new("apply", name), &edit, |b, edit| {
            b.iter(|| {
                let mut target = create_customer(1);
                mapper.update_via_json(&mut target, black_box(edit)).unwrap();
                black_box(target)
            })
        });
    }

    group.finish();
}

fn bench_copy_slice(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_slice");
    let mapper = Mapper::new();

    for size in [10i64, 100, 1000] {
        let rows: Vec<CustomerRow> = (0..size).map(create_row).collect();
        group.bench_with_input(BenchmarkId::new("rows_to_customers", size), &rows, |b, rows| {
            b.iter(|| {
                let mut target: Vec<Customer> = Vec::with_capacity(rows.len());
                mapper.copy_slice(black_box(rows), &mut target).unwrap();
                black_box(target)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_normalize,
    bench_update,
    bench_update_via_json,
    bench_copy_slice
);
criterion_main!(benches);
