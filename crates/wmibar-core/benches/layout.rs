//! Benchmarks for item discovery and width computation.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use wmibar_core::item;
use wmibar_core::layout;
use wmibar_core::vfs::Namespace;

fn bench_discover(c: &mut Criterion) {
    let mut group = c.benchmark_group("item_discover");

    for n_items in [10, 100, 1_000] {
        let mut ns: Namespace<()> = Namespace::new();
        for name in ["ctl", "new", "font", "geometry"] {
            ns.create(&format!("/{name}")).unwrap();
        }
        // Reverse order so the sort has work to do.
        for i in (1..=n_items).rev() {
            ns.create(&format!("/{i}")).unwrap();
            ns.create_file(&format!("/{i}/data"), b"label").unwrap();
        }
        group.bench_function(BenchmarkId::new("discover", n_items), |b| {
            b.iter(|| item::discover(&ns));
        });
    }

    group.finish();
}

fn bench_widths(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_widths");

    for n_items in [10, 100, 1_000] {
        let precalc: Vec<u32> = (0..n_items).map(|i| 20 + (i % 7) * 8).collect();
        group.bench_function(BenchmarkId::new("failsafe", n_items), |b| {
            b.iter(|| layout::compute_widths(1920, &precalc, None));
        });
        group.bench_function(BenchmarkId::new("expandable", n_items), |b| {
            b.iter(|| {
                let (widths, _) = layout::compute_widths(100_000, &precalc, Some(0));
                layout::offsets(&widths)
            });
        });
    }

    group.finish();
}

fn bench_resolve_expandable(c: &mut Criterion) {
    let names: Vec<String> = (1..=500).map(|i| i.to_string()).collect();
    let mut sorted: Vec<&str> = names.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    c.bench_function("resolve_expandable_500", |b| {
        b.iter(|| layout::resolve_expandable("250", 500, &sorted));
    });
}

criterion_group!(benches, bench_discover, bench_widths, bench_resolve_expandable);
criterion_main!(benches);
