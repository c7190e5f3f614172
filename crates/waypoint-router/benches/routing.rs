//! Routing benchmarks.
//!
//! Run with: `cargo bench -p waypoint-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use waypoint_router::{MethodRouter, Router};

fn build_router(num_routes: usize) -> Router<usize> {
    let mut router = Router::new();

    for i in 0..num_routes / 3 {
        router
            .insert(&format!("/api/v1/resource{i}"), MethodRouter::new().get(i))
            .unwrap();
        router
            .insert(
                &format!("/api/v1/resource{i}/:id"),
                MethodRouter::new().get(i).delete(i),
            )
            .unwrap();
        router
            .insert(
                &format!("/api/v1/org/:orgId/resource{i}/:id?"),
                MethodRouter::new().get(i),
            )
            .unwrap();
    }

    router
}

fn bench_lookups(c: &mut Criterion) {
    let router = build_router(99);

    c.bench_function("static_match", |b| {
        b.iter(|| black_box(router.lookup(&Method::GET, black_box("/api/v1/resource20"))));
    });

    c.bench_function("param_match", |b| {
        b.iter(|| black_box(router.lookup(&Method::GET, black_box("/api/v1/resource20/12345"))));
    });

    c.bench_function("nested_optional_match", |b| {
        b.iter(|| {
            black_box(router.lookup(
                &Method::GET,
                black_box("/api/v1/org/acme-corp/resource10"),
            ))
        });
    });

    c.bench_function("method_not_allowed", |b| {
        b.iter(|| black_box(router.lookup(&Method::PATCH, black_box("/api/v1/resource20/1"))));
    });

    c.bench_function("miss", |b| {
        b.iter(|| black_box(router.lookup(&Method::GET, black_box("/api/v1/nonexistent/path"))));
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_count");
    for size in [30, 300, 3000] {
        let router = build_router(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &router, |b, router| {
            b.iter(|| black_box(router.lookup(&Method::GET, black_box("/api/v1/org/x/resource5/9"))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lookups, bench_scaling);
criterion_main!(benches);
