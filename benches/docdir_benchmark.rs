use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use docdir::constants::SPECIALTIES;
use docdir::prelude::*;
use serde_json::{json, Value};

// Synthetic payload shaped like the public endpoint's records
fn synthetic_records(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": i.to_string(),
                "name": format!("Dr. Provider {}", i),
                "specialities": [{"name": SPECIALTIES[i % SPECIALTIES.len()].replace('-', " ")}],
                "fees": format!("₹ {}", 200 + (i * 37) % 1800),
                "experience": format!("{} Years of experience", (i * 7) % 40),
                "video_consult": i % 3 == 0,
                "in_clinic": i % 2 == 0,
            })
        })
        .collect()
}

fn benchmark_normalize(c: &mut Criterion) {
    let records = synthetic_records(5_000);
    c.bench_function("normalize_5k", |b| {
        b.iter(|| normalize(black_box(&records)))
    });
}

fn benchmark_derive_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_view");

    for size in [1_000usize, 10_000] {
        let directory = Directory::from_raw(&synthetic_records(size));
        let queries = [
            ("empty", QueryState::new()),
            ("search", QueryState::new().set_search("provider 1")),
            ("specialties_sorted", QueryState::from_query_string(
                "specialty=General-Physician&specialty=Dentist&consultation=video&sort=fees",
            )),
            ("experience_sort", QueryState::new().toggle_sort(SortKey::Experience)),
        ];

        for (label, query) in &queries {
            group.bench_with_input(BenchmarkId::new(*label, size), query, |b, query| {
                b.iter(|| directory.view(black_box(query)))
            });
        }
    }

    group.finish();
}

fn benchmark_query_codec(c: &mut Criterion) {
    let query = QueryState::new()
        .set_search("anita rao")
        .toggle_specialty("General-Physician")
        .toggle_specialty("Dietitian-Nutritionist")
        .toggle_sort(SortKey::Fees);
    let encoded = query.to_query_string();

    c.bench_function("query_encode", |b| b.iter(|| black_box(&query).to_query_string()));
    c.bench_function("query_decode", |b| {
        b.iter(|| QueryState::from_query_string(black_box(&encoded)))
    });
}

criterion_group!(benches, benchmark_normalize, benchmark_derive_view, benchmark_query_codec);
criterion_main!(benches);
