//! Datasets shared by the integration tests

#![allow(dead_code)]

use posthoc::DataFrame;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

pub const MONTHS: [&str; 3] = ["August", "January", "June"];
pub const SUBJECTS_PER_GROUP: usize = 30;

fn normal_sample(rng: &mut StdRng, mean: f64, n: usize) -> Vec<f64> {
    let normal = Normal::new(mean, 1.0).unwrap();
    (0..n).map(|_| normal.sample(rng)).collect()
}

/// Mixed design: `Scores` by `Time` (within) and `Group` (between)
///
/// Each group has 30 subjects measured in August, January and June. The
/// control group stays at 5.5 while the meditation group improves to 5.8
/// and 6.4. Rows are ordered by group, then month, then subject.
pub fn mixed_design() -> DataFrame {
    let n = SUBJECTS_PER_GROUP;
    let mut rng = StdRng::seed_from_u64(1234);

    let mut scores = normal_sample(&mut rng, 5.5, 3 * n);
    for mean in [5.5, 5.8, 6.4] {
        scores.extend(normal_sample(&mut rng, mean, n));
    }

    let mut time = Vec::with_capacity(6 * n);
    let mut group = Vec::with_capacity(6 * n);
    let mut subject = Vec::with_capacity(6 * n);
    for (prefix, label) in [("C", "Control"), ("M", "Meditation")] {
        for month in MONTHS {
            for s in 0..n {
                time.push(month.to_string());
                group.push(label.to_string());
                subject.push(format!("{}{}", prefix, s));
            }
        }
    }

    let mut df = DataFrame::new();
    df.add_float_column("Scores", scores).unwrap();
    df.add_string_column("Time", time).unwrap();
    df.add_string_column("Group", group).unwrap();
    df.add_string_column("Subject", subject).unwrap();
    df
}

/// Three independent standard normal columns `X`, `Y` and `Z`
pub fn correlation_data() -> DataFrame {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut df = DataFrame::new();
    for name in ["X", "Y", "Z"] {
        df.add_float_column(name, normal_sample(&mut rng, 0.0, 100))
            .unwrap();
    }
    df
}

/// Pain threshold by hair color (McClave and Dietrich, 1991)
pub fn pain_thresholds() -> DataFrame {
    let color: Vec<&str> = ["LB"; 5]
        .into_iter()
        .chain(["DB"; 5])
        .chain(["LBr"; 4])
        .chain(["DBr"; 5])
        .collect();
    let pain = vec![
        62.0, 60.0, 71.0, 55.0, 48.0, 63.0, 57.0, 52.0, 41.0, 43.0, 42.0, 50.0, 41.0, 37.0, 32.0,
        39.0, 51.0, 30.0, 35.0,
    ];

    let mut df = DataFrame::new();
    df.add_string_column("Color", color).unwrap();
    df.add_float_column("Pain", pain).unwrap();
    df
}
