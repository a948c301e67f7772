use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use posthoc::stats::distributions::{Distribution, StudentizedRange};
use posthoc::{
    pairwise_corr, pairwise_ttests, pairwise_tukey, DataFrame, PAdjust, PairwiseCorrOptions,
    PairwiseTTestsOptions, PairwiseTukeyOptions, Result,
};

/// Deterministic pseudo-random values in [0, 1)
fn noise(i: usize, seed: u64) -> f64 {
    let mut x = (i as u64).wrapping_add(seed).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x ^= x >> 31;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 29;
    (x >> 11) as f64 / (1u64 << 53) as f64
}

fn create_design(subjects: usize, levels: usize) -> Result<DataFrame> {
    let size = subjects * levels;
    let mut scores = Vec::with_capacity(size);
    let mut level = Vec::with_capacity(size);
    let mut group = Vec::with_capacity(size);
    for l in 0..levels {
        for s in 0..subjects {
            scores.push(5.0 + 0.1 * l as f64 + noise(l * subjects + s, 7));
            level.push(format!("L{}", l));
            group.push(if s % 2 == 0 { "A" } else { "B" }.to_string());
        }
    }

    let mut df = DataFrame::new();
    df.add_float_column("score", scores)?;
    df.add_string_column("level", level)?;
    df.add_string_column("group", group)?;
    Ok(df)
}

fn create_columns(rows: usize, columns: usize) -> Result<DataFrame> {
    let mut df = DataFrame::new();
    for c in 0..columns {
        let values = (0..rows).map(|i| noise(i, c as u64)).collect();
        df.add_float_column(format!("c{}", c), values)?;
    }
    Ok(df)
}

fn bench_pairwise_ttests(c: &mut Criterion) {
    let mut group = c.benchmark_group("pairwise_ttests");

    for levels in [3, 6].iter() {
        let df = create_design(40, *levels).unwrap();
        let options = PairwiseTTestsOptions::new("score")
            .with_within("level")
            .with_between("group")
            .with_padjust(PAdjust::Holm);
        group.bench_with_input(BenchmarkId::new("all_effects", levels), &df, |b, df| {
            b.iter(|| black_box(pairwise_ttests(df, &options).unwrap()));
        });
    }

    group.finish();
}

fn bench_pairwise_tukey(c: &mut Criterion) {
    let mut group = c.benchmark_group("pairwise_tukey");

    for levels in [4, 8].iter() {
        let df = create_design(25, *levels).unwrap();
        let options = PairwiseTukeyOptions::new("score", "level");
        group.bench_with_input(BenchmarkId::new("levels", levels), &df, |b, df| {
            b.iter(|| black_box(pairwise_tukey(df, &options).unwrap()));
        });
    }

    group.bench_function("studentized_range_sf", |b| {
        let dist = StudentizedRange::new(5.0, 30.0).unwrap();
        b.iter(|| black_box(dist.sf(black_box(3.2))));
    });

    group.finish();
}

fn bench_pairwise_corr(c: &mut Criterion) {
    let mut group = c.benchmark_group("pairwise_corr");

    for columns in [5, 20].iter() {
        let df = create_columns(500, *columns).unwrap();
        let options = PairwiseCorrOptions::new().with_padjust(PAdjust::FdrBh);
        group.bench_with_input(BenchmarkId::new("pearson", columns), &df, |b, df| {
            b.iter(|| black_box(pairwise_corr(df, &options).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_pairwise_ttests,
    bench_pairwise_tukey,
    bench_pairwise_corr
);
criterion_main!(benches);
