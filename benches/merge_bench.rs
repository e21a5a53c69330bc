use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use hocon_tree::config::Config;
use hocon_tree::hocon;
use hocon_tree::value::Value;

const SERVICES: usize = 200;

fn service(index: usize) -> Value {
    let name = format!("service-{index}");
    let port = 8000 + index as i64;
    hocon!({
        name: name,
        port: port,
        tags: ["a", "b", "c"],
        limits { cpu: 2, memory: "512M" }
    })
}

fn build_config() -> Config {
    let mut config = Config::default();
    config
        .add_value("defaults", hocon!({ timeout: 30, retries: 3 }))
        .unwrap();
    for index in 0..SERVICES {
        let path = format!("services.s{index}");
        config.add_substitution(&path, "defaults", false).unwrap();
        config.add_value(&path, service(index)).unwrap();
    }
    config
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("document");

    group.bench_function("build", |b| {
        b.iter(build_config);
    });

    group.bench_function("with_fallback", |b| {
        let primary = build_config();
        let fallback = build_config();
        b.iter(|| primary.with_fallback(&fallback).unwrap());
    });

    group.bench_function("resolve_and_freeze", |b| {
        b.iter_batched(
            build_config,
            |mut config| config.resolve().unwrap(),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn custom_criterion() -> Criterion {
    Criterion::default()
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(50)
}

criterion_group! {
    name = benches;
    config = custom_criterion();
    targets = criterion_benchmark
}
criterion_main!(benches);
