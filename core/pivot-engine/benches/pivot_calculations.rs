use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pivot_engine::{
    aggregate, aggregate_pairs, format_category_charts, BubbleAxes, CategoryCatalog, ChartLayout,
    ColorTable, Domain, UnknownLabelPolicy, EVALUATORS, SPATIAL_ENCODINGS,
};
use records::{Record, RecordField};

const SUB_DOMAINS: [&str; 4] = ["Natural Science", "Physical Science", "Engineering", "Medicine"];
const NON_SPATIAL: [&str; 5] = ["Table", "Color", "Size", "Shape", "Text"];

/// Deterministic synthetic batch: every record spans two sub-domains and
/// several labels per family, so the cross-product fan-out is exercised.
fn build_records(count: usize) -> Vec<Record> {
    let catalog = CategoryCatalog::default();
    (0..count)
        .map(|i| {
            let pick = |labels: &[String], n: usize| -> Vec<String> {
                (0..n).map(|k| labels[(i + k * 3) % labels.len()].clone()).collect()
            };
            Record::new(&format!("Author {}", i % 97), &(2005 + i % 12).to_string())
                .with(RecordField::SubDomain, [SUB_DOMAINS[i % 4], SUB_DOMAINS[(i + 1) % 4]])
                .with(RecordField::Tasks, pick(&catalog.tasks, 3))
                .with(RecordField::DataTypes, pick(&catalog.data_types, 2))
                .with(RecordField::Evaluation, pick(&catalog.evaluation, 1))
                .with(RecordField::Paradigms, pick(&catalog.paradigms, 1))
                .with(RecordField::Encodings, [SPATIAL_ENCODINGS[i % 8], NON_SPATIAL[i % 5], NON_SPATIAL[(i + 2) % 5]])
                .with(RecordField::Evaluators, [EVALUATORS[i % 2]])
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let catalog = CategoryCatalog::default();
    let mut group = c.benchmark_group("aggregate");

    for &rows in &[100usize, 1_000, 10_000] {
        let records = build_records(rows);
        let subs = Domain::sub_domains_of(&records);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &records, |b, records| {
            b.iter(|| aggregate(black_box(records), &catalog, &subs, UnknownLabelPolicy::Reject).unwrap())
        });
    }
    group.finish();
}

fn bench_aggregate_pairs(c: &mut Criterion) {
    let records = build_records(10_000);
    let axes = BubbleAxes::encodings(BubbleAxes::non_spatial_encodings(&records));

    c.bench_function("aggregate_pairs/10000", |b| {
        b.iter(|| aggregate_pairs(black_box(&records), &axes))
    });
}

fn bench_format(c: &mut Criterion) {
    let records = build_records(10_000);
    let pivot = aggregate(
        &records,
        &CategoryCatalog::default(),
        &Domain::sub_domains_of(&records),
        UnknownLabelPolicy::Reject,
    )
    .unwrap();
    let colors = ColorTable::new(
        ["#fbb4ae", "#b3cde3", "#ccebc5", "#decbe4", "#fed9a6"].map(String::from).to_vec(),
        ["#e41a1c", "#377eb8"].map(String::from).to_vec(),
    );

    c.bench_function("format_category_charts/10000", |b| {
        b.iter(|| format_category_charts(black_box(&pivot), &colors, ChartLayout::CategoryMajor).unwrap())
    });
}

criterion_group!(benches, bench_aggregate, bench_aggregate_pairs, bench_format);
criterion_main!(benches);
