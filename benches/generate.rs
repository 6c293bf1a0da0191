use std::convert::Infallible;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::{HeaderValue, Request, Response};
use tower::{service_fn, ServiceExt};

use correlation::{Correlation, IdType, Options};

fn options_for(id_type: IdType) -> Options {
    match id_type {
        IdType::Custom => Options::custom("checkout-service"),
        _ => Options {
            id_type,
            ..Options::default()
        },
    }
}

async fn ok(_req: Request<()>) -> Result<Response<()>, Infallible> {
    Ok(Response::new(()))
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for id_type in IdType::ALL {
        let correlation = Correlation::new(options_for(id_type));
        group.bench_with_input(
            BenchmarkId::new("strategy", id_type),
            &correlation,
            |b, correlation| b.iter(|| black_box(correlation.generate())),
        );
    }

    group.finish();
}

fn bench_wrap(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let mut group = c.benchmark_group("wrap");

    for id_type in IdType::ALL {
        let svc = Correlation::new(options_for(id_type)).wrap(service_fn(ok));
        group.bench_with_input(BenchmarkId::new("generated", id_type), &svc, |b, svc| {
            b.iter(|| {
                let req = Request::get("/foo").body(()).unwrap();
                black_box(rt.block_on(svc.clone().oneshot(req)).unwrap())
            });
        });
    }

    let svc = Correlation::default().wrap(service_fn(ok));
    group.bench_function("forwarded", |b| {
        b.iter(|| {
            let mut req = Request::get("/foo").body(()).unwrap();
            req.headers_mut().insert(
                "x-correlation-id",
                HeaderValue::from_static("3f2b8c1e-5d4a-4f6b-9e7c-0a1b2c3d4e5f"),
            );
            black_box(rt.block_on(svc.clone().oneshot(req)).unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_generate, bench_wrap);
criterion_main!(benches);
