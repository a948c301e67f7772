//! Gauss-Legendre quadrature used by the Bayes factors and power functions
//!
//! All integrands in this crate are smooth on the integration range, so a
//! composite fixed-order rule is accurate without adaptive refinement.

use std::f64::consts::PI;

/// Gauss-Legendre nodes and weights on [-1, 1]
#[derive(Debug, Clone)]
pub struct GaussLegendre {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl GaussLegendre {
    /// Build an `n`-point rule
    ///
    /// Nodes are the roots of the Legendre polynomial, found by Newton
    /// iteration from a Chebyshev initial guess.
    pub fn new(n: usize) -> Self {
        let n = n.max(1);
        let mut nodes = vec![0.0; n];
        let mut weights = vec![0.0; n];

        let m = n.div_ceil(2);

        for i in 0..m {
            let mut z = ((i as f64 + 0.75) / (n as f64 + 0.5) * PI).cos();

            for _ in 0..100 {
                let (p, dp) = legendre_p_and_dp(n, z);
                let z_new = z - p / dp;
                if (z_new - z).abs() < 1e-15 {
                    z = z_new;
                    break;
                }
                z = z_new;
            }

            let (_, dp) = legendre_p_and_dp(n, z);
            let w = 2.0 / ((1.0 - z * z) * dp * dp);

            nodes[i] = -z;
            nodes[n - 1 - i] = z;
            weights[i] = w;
            weights[n - 1 - i] = w;
        }

        Self { nodes, weights }
    }

    /// Integrate `f` over [a, b] split into `panels` equal sub-intervals
    pub fn integrate<F>(&self, f: F, a: f64, b: f64, panels: usize) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let panels = panels.max(1);
        let width = (b - a) / panels as f64;
        let half = 0.5 * width;

        let mut total = 0.0;
        for k in 0..panels {
            let mid = a + (k as f64 + 0.5) * width;
            let panel: f64 = self
                .nodes
                .iter()
                .zip(self.weights.iter())
                .map(|(&x, &w)| w * f(mid + half * x))
                .sum();
            total += half * panel;
        }
        total
    }

    /// Integrate `f` over (0, inf) with the substitution `g = exp(s)`
    ///
    /// `ln_f` returns the logarithm of the integrand, which keeps integrands
    /// with very large or very small magnitudes representable.
    pub fn integrate_positive_log<F>(&self, ln_f: F, s_min: f64, s_max: f64, panels: usize) -> f64
    where
        F: Fn(f64) -> f64,
    {
        self.integrate(
            |s| {
                let value = (ln_f(s.exp()) + s).exp();
                if value.is_finite() {
                    value
                } else if value.is_nan() {
                    0.0
                } else {
                    f64::MAX
                }
            },
            s_min,
            s_max,
            panels,
        )
    }
}

/// Evaluate Legendre polynomial P_n(x) and its derivative.
fn legendre_p_and_dp(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    if n == 1 {
        return (x, 1.0);
    }

    let mut p_prev = 1.0;
    let mut p_curr = x;

    for k in 2..=n {
        let p_next = ((2 * k - 1) as f64 * x * p_curr - (k - 1) as f64 * p_prev) / k as f64;
        p_prev = p_curr;
        p_curr = p_next;
    }

    let dp = n as f64 * (x * p_curr - p_prev) / (x * x - 1.0);

    (p_curr, dp)
}
