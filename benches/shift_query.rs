use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use serde_json::json;
use shiftdesk::registry::build_router;
use shiftdesk::shift::{ShiftQuery, ShiftQueryEngine};
use shiftdesk::store::Record;
use std::hint::black_box;

fn dataset(n: usize) -> Vec<Record> {
    let codes = ["MORNING", "NIGHT", "EVENING", "AFTERNOON"];
    (0..n)
        .filter_map(|i| {
            Record::from_value(json!({
                "id": format!("shift-{i}"),
                "shift_code": format!("{}-{i}", codes[i % codes.len()]),
                "day_type": if i % 3 == 0 { "OFF" } else { "Working Day" },
                "status": if i % 5 == 0 { "Inactive" } else { "Active" },
                "created_at": format!("2024-01-{:02}T08:00:00.000Z", i % 28 + 1),
            }))
        })
        .collect()
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn bench_shift_query(c: &mut Criterion) {
    let engine = ShiftQueryEngine::default();
    let records = dataset(5_000);

    let default_listing = ShiftQuery::from_params(&params(&[]));
    c.bench_function("shift_default_listing", |b| {
        b.iter(|| engine.run(black_box(&records), &default_listing))
    });

    let filtered = ShiftQuery::from_params(&params(&[
        ("filter_day_type", "true"),
        ("filter_status", "true"),
        ("search", "mor"),
        ("_page", "3"),
        ("_limit", "25"),
    ]));
    c.bench_function("shift_filter_search_page", |b| {
        b.iter(|| engine.run(black_box(&records), &filtered))
    });

    let ordered = ShiftQuery::from_params(&params(&[
        ("order_column", "shift_code"),
        ("order", "desc"),
    ]));
    c.bench_function("shift_order_by_column", |b| {
        b.iter(|| engine.run(black_box(&records), &ordered))
    });
}

fn bench_routing(c: &mut Criterion) {
    let router = build_router().unwrap();
    c.bench_function("route_shift_daily_item", |b| {
        b.iter(|| router.route(&Method::GET, black_box("/shift_daily/abc123")))
    });
    c.bench_function("route_fallback_collection", |b| {
        b.iter(|| router.route(&Method::PATCH, black_box("/posts/42")))
    });
}

criterion_group!(benches, bench_shift_query, bench_routing);
criterion_main!(benches);
