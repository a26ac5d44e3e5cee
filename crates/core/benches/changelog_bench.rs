//! Benchmarks for loading, comparison and classification
//!
//! Run with: cargo bench -p datacontract-core

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use datacontract_core::config::ChangelogConfig;
use datacontract_core::diff;
use datacontract_core::loader::ContractLoader;
use datacontract_core::models::{
    Contract, DataType, Field, Model, QualityKind, QualityRule, Threshold,
};

/// Contract with `model_count` models of `field_count` fields each
fn generate_contract(model_count: usize, field_count: usize) -> Contract {
    let models = (0..model_count).map(|m| {
        let fields = (0..field_count)
            .map(|f| {
                let data_type = if f % 3 == 0 { DataType::Long } else { DataType::String };
                Field::scalar(format!("field_{}", f), data_type)
                    .with_required(f % 2 == 0)
                    .with_description(format!("Field {} of model {}", f, m))
            })
            .collect();
        Model::new(format!("model_{}", m))
            .with_model_type("table")
            .with_fields(fields)
            .with_quality_rule(
                QualityRule::new(QualityKind::RowCount).with_threshold(Threshold::at_least(1.0)),
            )
    });
    Contract::new("urn:bench", "Bench", "1.0.0").with_models(models.collect())
}

/// Second version touching every tenth field of every model
fn evolve(contract: &Contract) -> Contract {
    let mut next = contract.clone();
    next.info.version = "2.0.0".to_string();
    for model in &mut next.models {
        let len = model.fields.len();
        for (i, field) in model.fields.iter_mut().enumerate() {
            match i % 10 {
                0 => field.required = !field.required,
                5 => field.description = Some("rewritten".to_string()),
                _ => {}
            }
        }
        if len > 1 {
            model.fields.remove(len - 1);
        }
        model.fields.push(Field::scalar("added", DataType::Boolean));
        model.quality[0].threshold = Threshold::at_least(100.0);
    }
    next
}

fn to_yaml(model_count: usize, field_count: usize) -> String {
    let mut yaml =
        String::from("id: urn:bench\ninfo:\n  title: Bench\n  version: 1.0.0\nmodels:\n");
    for m in 0..model_count {
        yaml.push_str(&format!("  model_{}:\n    type: table\n    fields:\n", m));
        for f in 0..field_count {
            yaml.push_str(&format!(
                "      field_{}: {{ type: varchar, required: {}, maxLength: 64 }}\n",
                f,
                f % 2 == 0
            ));
        }
    }
    yaml
}

/// Benchmark YAML loading
fn bench_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("loading");

    for field_count in [10usize, 100, 500].iter() {
        let yaml = to_yaml(5, *field_count);
        group.throughput(Throughput::Bytes(yaml.len() as u64));

        group.bench_with_input(BenchmarkId::new("load_str", field_count), &yaml, |b, yaml| {
            b.iter(|| {
                let loader = ContractLoader::default();
                black_box(loader.load_str(yaml))
            });
        });
    }

    group.finish();
}

/// Benchmark raw comparison against full changelog construction
fn bench_changelog(c: &mut Criterion) {
    let mut group = c.benchmark_group("changelog");
    let config = ChangelogConfig::default();

    for (models, fields) in [(1usize, 50usize), (10, 50), (20, 200)].iter() {
        let old = generate_contract(*models, *fields);
        let new = evolve(&old);
        group.throughput(Throughput::Elements((*models * *fields) as u64));
        let label = format!("{}x{}", models, fields);

        group.bench_with_input(BenchmarkId::new("diff", &label), &(&old, &new), |b, (old, new)| {
            b.iter(|| black_box(diff::diff(old, new)))
        });

        group.bench_with_input(
            BenchmarkId::new("changelog", &label),
            &(&old, &new),
            |b, (old, new)| b.iter(|| black_box(diff::changelog(old, new, &config).summary())),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_loading, bench_changelog);
criterion_main!(benches);
