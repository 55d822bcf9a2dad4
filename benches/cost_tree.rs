use bom_processor::{FlatRecord, build_forest, subtree_cost, total_cost};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// Bill of materials with `assemblies` assemblies of `parts` parts each
fn synthetic_bom(assemblies: usize, parts: usize) -> Vec<FlatRecord> {
    let mut records = vec![FlatRecord::new("Product", "Product", 1)];
    for a in 0..assemblies {
        let assembly = format!("assembly-{a}");
        records.push(FlatRecord::new(&assembly, "Assembly", 1).with_parent("Product"));
        for p in 0..parts {
            records.push(
                FlatRecord::new(format!("part-{a}-{p}"), "Part", (p % 7) as u32 + 1)
                    .with_price(1.0 + p as f64 * 0.25)
                    .with_failure_rate(0.1 * (a % 5) as f64)
                    .with_parent(&assembly),
            );
        }
    }
    records
}

fn bench_cost_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("cost_tree");

    for (assemblies, parts) in [(10, 10), (50, 40)] {
        let records = synthetic_bom(assemblies, parts);
        let size = records.len();

        group.bench_with_input(BenchmarkId::new("build_forest", size), &records, |b, r| {
            b.iter(|| build_forest(black_box(r)))
        });

        let forest = build_forest(&records);
        group.bench_with_input(BenchmarkId::new("total_cost", size), &forest, |b, f| {
            b.iter(|| total_cost(black_box(&f[0])))
        });

        group.bench_with_input(BenchmarkId::new("subtree_cost", size), &records, |b, r| {
            b.iter(|| subtree_cost(black_box(r), "Product"))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cost_tree);
criterion_main!(benches);
