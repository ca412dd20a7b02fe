//! Benchmarks for module loading.
//!
//! - `registry/*`: merging descriptor tables into the bounded registry
//! - `load/*`: the full load sequence against the in-process host
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin
//! ```

use criterion::{Criterion, criterion_group, criterion_main};
use jetson_utils::{
    Diagnostics, FunctionRegistry, InProcessHost, LoaderConfig, ModuleLoader,
    default_contributors,
};
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

fn registry_benchmarks(c: &mut Criterion) {
    let contributors = default_contributors();
    let mut group = c.benchmark_group("registry");

    group.bench_function("initialize_functions", |b| {
        let mut registry = FunctionRegistry::with_diagnostics(Diagnostics::silent("bench"));
        b.iter(|| {
            registry.initialize_functions(black_box(&contributors));
            registry.diagnostics_mut().clear();
            black_box(registry.len())
        });
    });

    group.bench_function("append_overflow", |b| {
        let table = jetson_utils::cuda::register_functions();
        let mut registry = FunctionRegistry::<4>::bounded(Diagnostics::silent("bench"));
        b.iter(|| {
            registry.clear();
            registry.diagnostics_mut().clear();
            black_box(registry.append(Some(black_box(table))))
        });
    });

    group.finish();
}

fn load_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("load");

    group.bench_function("default_contributors", |b| {
        b.iter(|| {
            let config = LoaderConfig::default().with_echo(false);
            let mut loader =
                ModuleLoader::new(InProcessHost::default(), default_contributors(), config);
            let module = loader.load().unwrap();
            end_profiling_frame();
            black_box(module.function_count())
        });
    });

    group.finish();
}

criterion_group!(benches, registry_benchmarks, load_benchmarks);
criterion_main!(benches);
