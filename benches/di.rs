use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lifestyle_di::*;
use std::sync::Arc;

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let mut sc = ServiceCollection::new();
    sc.add_singleton(42u64);
    let injector = sc.build();

    // Prime the singleton
    let _ = injector.get::<u64>().unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = injector.get::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let mut sc = ServiceCollection::new();
                sc.add_singleton_factory::<ExpensiveToCreate, _>(|_| {
                    Ok(ExpensiveToCreate {
                        data: (0..1000).collect(),
                    })
                });
                sc.build()
            },
            |injector| {
                let v = injector.get::<ExpensiveToCreate>().unwrap();
                black_box(v.data.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_scoped_vs_per_request(c: &mut Criterion) {
    struct Service {
        data: [u8; 64],
    }

    let mut group = c.benchmark_group("scoped_vs_per_request");

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<Service, _>(|_| Ok(Service { data: [0; 64] }));
    let injector = sc.build();
    let ctx = injector.create_context();
    let scope = ctx.create_scope();

    group.bench_function("scoped_hit", |b| {
        b.iter(|| {
            let v = scope.get::<Service>().unwrap();
            black_box(&v.data);
        })
    });
    drop(scope);

    let mut sc = ServiceCollection::new();
    sc.add_per_request_factory::<Service, _>(|_| Ok(Service { data: [0; 64] }));
    let injector = sc.build();
    let ctx = injector.create_context();

    group.bench_function("per_request", |b| {
        b.iter(|| {
            let v = ctx.get::<Service>().unwrap();
            black_box(&v.data);
        })
    });

    group.finish();
}

fn bench_scope_lifecycle(c: &mut Criterion) {
    struct Session(u64);

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<Session, _>(|_| Ok(Session(7)));
    let injector = sc.build();
    let ctx = injector.create_context();

    c.bench_function("scope_open_resolve_close", |b| {
        b.iter(|| {
            ctx.with_scope(|scope| {
                let v = scope.get::<Session>().unwrap();
                black_box(v.0);
            })
        })
    });
}

fn bench_concrete_vs_trait(c: &mut Criterion) {
    trait MyTrait: Send + Sync {
        fn value(&self) -> u64;
    }

    struct ConcreteImpl {
        val: u64,
    }

    impl MyTrait for ConcreteImpl {
        fn value(&self) -> u64 {
            self.val
        }
    }

    let mut group = c.benchmark_group("concrete_vs_trait");

    let mut sc = ServiceCollection::new();
    sc.add_singleton(ConcreteImpl { val: 42 });
    sc.add_singleton_trait(Arc::new(ConcreteImpl { val: 42 }) as Arc<dyn MyTrait>);
    let injector = sc.build();

    group.bench_function("concrete", |b| {
        b.iter(|| {
            let v = injector.get::<ConcreteImpl>().unwrap();
            black_box(v.val);
        })
    });

    group.bench_function("trait", |b| {
        b.iter(|| {
            let v = injector.get_trait::<dyn MyTrait>().unwrap();
            black_box(v.value());
        })
    });

    group.finish();
}

fn bench_dependency_chain(c: &mut Criterion) {
    struct Link(#[allow(dead_code)] Option<Arc<Link>>);

    let mut group = c.benchmark_group("dependency_chain");

    for &depth in &[1usize, 8, 32] {
        // Each symbol resolves the previous one, per request.
        const NAMES: [&str; 32] = [
            "l0", "l1", "l2", "l3", "l4", "l5", "l6", "l7", "l8", "l9", "l10", "l11", "l12", "l13", "l14", "l15",
            "l16", "l17", "l18", "l19", "l20", "l21", "l22", "l23", "l24", "l25", "l26", "l27", "l28", "l29",
            "l30", "l31",
        ];
        let mut sc = ServiceCollection::new();
        for (i, name) in NAMES.iter().copied().take(depth).enumerate() {
            let prev = if i == 0 { None } else { Some(NAMES[i - 1]) };
            sc.add_named_factory::<Link, _>(name, Lifetime::PerRequest, move |ctx| {
                Ok(Link(prev.map(|p| ctx.get_named::<Link>(p)).transpose()?))
            })
            .unwrap();
        }
        let injector = sc.build();
        let top = NAMES[depth - 1];

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| {
                let v = injector.get_named::<Link>(top).unwrap();
                black_box(v);
            })
        });
    }

    group.finish();
}

fn bench_profile_apply(c: &mut Criterion) {
    struct FileSink {
        path: String,
    }

    let profile = Profile::new("release").with_params("FileSink", Params::new().with("path", "release.log"));

    c.bench_function("profile_apply_and_build", |b| {
        b.iter(|| {
            let mut sc = ServiceCollection::new();
            sc.add_constructor::<FileSink, _>(Lifetime::Singleton, Params::new().with("path", "dev.log"), |p| {
                Ok(FileSink { path: p.require("path")? })
            });
            sc.apply_profile(&profile).unwrap();
            let injector = sc.build();
            black_box(injector.get::<FileSink>().unwrap().path.len());
        })
    });
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_scoped_vs_per_request,
    bench_scope_lifecycle,
    bench_concrete_vs_trait,
    bench_dependency_chain,
    bench_profile_apply,
);
criterion_main!(benches);
