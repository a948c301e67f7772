//! Probability distributions needed by the pairwise procedures
//!
//! The normal and Student t distributions come from `statrs`. This module
//! adds the two distributions `statrs` does not provide: the studentized
//! range (Tukey HSD, Games-Howell) and the noncentral t (power analysis).

use crate::core::error::{Error, Result};
use crate::stats::quadrature::GaussLegendre;
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::function::erf::{erfc, erfc_inv};
use statrs::function::gamma::ln_gamma;
use std::f64::consts::{LN_2, SQRT_2};

const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Trait for the distributions implemented in this module
pub trait Distribution {
    /// Cumulative distribution function (CDF)
    fn cdf(&self, x: f64) -> f64;

    /// Survival function, 1 - CDF
    fn sf(&self, x: f64) -> f64 {
        1.0 - self.cdf(x)
    }

    /// Inverse CDF (quantile function)
    fn inverse_cdf(&self, p: f64) -> f64;
}

/// Standard normal CDF
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal survival function
pub fn normal_sf(x: f64) -> f64 {
    0.5 * erfc(x / SQRT_2)
}

/// Standard normal quantile function
pub fn normal_ppf(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    -SQRT_2 * erfc_inv(2.0 * p)
}

/// Student t distribution with `df` degrees of freedom
pub fn students_t(df: f64) -> Result<StudentsT> {
    if !(df > 0.0) {
        return Err(Error::InvalidValue(format!(
            "Degrees of freedom must be positive, got {}",
            df
        )));
    }
    Ok(StudentsT::new(0.0, 1.0, df)?)
}

/// Upper-tail probability of the t distribution
pub fn t_sf(t: f64, df: f64) -> Result<f64> {
    if t.is_nan() {
        return Ok(f64::NAN);
    }
    Ok(students_t(df)?.sf(t))
}

/// Quantile of the t distribution
pub fn t_ppf(p: f64, df: f64) -> Result<f64> {
    Ok(students_t(df)?.inverse_cdf(p))
}

/// Studentized range distribution
///
/// Distribution of the range of `k` independent standard normal variables
/// divided by an independent chi estimate with `df` degrees of freedom.
/// The CDF follows the Copenhaver and Holland (1988) algorithm: the range
/// probability for known variance is integrated against the density of the
/// variance estimate with Gauss-Legendre quadrature.
#[derive(Debug, Clone)]
pub struct StudentizedRange {
    /// Number of means
    pub k: f64,
    /// Degrees of freedom of the variance estimate
    pub df: f64,
}

impl StudentizedRange {
    pub fn new(k: f64, df: f64) -> Result<Self> {
        if !(k >= 2.0) {
            return Err(Error::InvalidValue(format!(
                "The studentized range needs at least two means, got {}",
                k
            )));
        }
        if !(df >= 1.0) {
            return Err(Error::InvalidValue(format!(
                "Degrees of freedom must be at least 1, got {}",
                df
            )));
        }
        Ok(Self { k, df })
    }

    /// Range probability for an infinite number of degrees of freedom
    ///
    /// Hartley's form: P(W <= w) for the range of `cc` normals, raised to
    /// the power `rr` (number of independent ranges).
    fn wprob(w: f64, rr: f64, cc: f64) -> f64 {
        const NLEG: usize = 12;
        const IHALF: usize = 6;
        const C1: f64 = -30.0;
        const C2: f64 = -50.0;
        const C3: f64 = 60.0;
        const BB: f64 = 8.0;
        const WLAR: f64 = 3.0;
        const WINCR1: f64 = 2.0;
        const WINCR2: f64 = 3.0;
        const XLEG: [f64; IHALF] = [
            0.981560634246719250690549090149,
            0.904117256370474856678465866119,
            0.769902674194304687036893833213,
            0.587317954286617447296702418941,
            0.367831498998180193752691536644,
            0.125233408511468915472441369464,
        ];
        const ALEG: [f64; IHALF] = [
            0.047175336386511827194615961485,
            0.106939325995318430960254718194,
            0.160078328543346226334652529543,
            0.203167426723065921749064455810,
            0.233492536538354808760849898925,
            0.249147045813402785000562436043,
        ];

        let qsqz = w * 0.5;

        // For w >= 16 the integral is 1 to within 1e-14
        if qsqz >= BB {
            return 1.0;
        }

        // (2 * Phi(w / 2) - 1) ^ cc, first term of Hartley's form
        let mut pr_w = 2.0 * normal_cdf(qsqz) - 1.0;
        pr_w = if pr_w >= (C2 / cc).exp() {
            pr_w.powf(cc)
        } else {
            0.0
        };

        let wincr = if w > WLAR { WINCR1 } else { WINCR2 };

        // Second term, integrated over (w/2, 8) in two or three intervals
        let mut blb = qsqz;
        let binc = (BB - qsqz) / wincr;
        let mut bub = blb + binc;
        let mut einsum = 0.0;
        let cc1 = cc - 1.0;

        let mut wi = 1.0;
        while wi <= wincr {
            let mut elsum = 0.0;
            let a = 0.5 * (bub + blb);
            let b = 0.5 * (bub - blb);

            for jj in 1..=NLEG {
                let (j, xx) = if IHALF < jj {
                    let j = NLEG - jj + 1;
                    (j, XLEG[j - 1])
                } else {
                    (jj, -XLEG[jj - 1])
                };
                let c = b * xx;
                let ac = a + c;

                // exp(-qexpo / 2) < 9e-14 does not contribute
                let qexpo = ac * ac;
                if qexpo > C3 {
                    break;
                }

                let pplus = 2.0 * normal_cdf(ac);
                let pminus = 2.0 * normal_cdf(ac - w);

                let mut rinsum = pplus * 0.5 - pminus * 0.5;
                if rinsum >= (C1 / cc1).exp() {
                    rinsum = ALEG[j - 1] * (-(0.5 * qexpo)).exp() * rinsum.powf(cc1);
                    elsum += rinsum;
                }
            }
            elsum *= 2.0 * b * cc * FRAC_1_SQRT_2PI;
            einsum += elsum;
            blb = bub;
            bub += binc;
            wi += 1.0;
        }

        pr_w += einsum;
        if pr_w <= (C1 / rr).exp() {
            return 0.0;
        }

        pr_w = pr_w.powf(rr);
        if pr_w >= 1.0 {
            1.0
        } else {
            pr_w
        }
    }

    /// CDF for `rr` independent ranges of `cc` means
    fn ptukey(q: f64, rr: f64, cc: f64, df: f64) -> f64 {
        const NLEGQ: usize = 16;
        const IHALFQ: usize = 8;
        const EPS1: f64 = -30.0;
        const EPS2: f64 = 1.0e-14;
        const DHAF: f64 = 100.0;
        const DQUAR: f64 = 800.0;
        const DEIGH: f64 = 5000.0;
        const DLARG: f64 = 25000.0;
        const XLEGQ: [f64; IHALFQ] = [
            0.989400934991649932596154173450,
            0.944575023073232576077988415535,
            0.865631202387831743880467897712,
            0.755404408355003033895101194847,
            0.617876244402643748446671764049,
            0.458016777657227386342419442984,
            0.281603550779258913230460501460,
            0.950125098376374401853193354250e-1,
        ];
        const ALEGQ: [f64; IHALFQ] = [
            0.271524594117540948517805724560e-1,
            0.622535239386478928628438369944e-1,
            0.951585116824927848099251076022e-1,
            0.124628971255533872052476282192,
            0.149595988816576732081501730547,
            0.169156519395002538189312079030,
            0.182603415044923588866763667969,
            0.189450610455068496285396723208,
        ];

        if q <= 0.0 {
            return 0.0;
        }
        if q.is_infinite() {
            return 1.0;
        }
        if df > DLARG {
            return Self::wprob(q, rr, cc);
        }

        // Leading constant of the chi density
        let f2 = df * 0.5;
        let mut f2lf = f2 * df.ln() - df * LN_2 - ln_gamma(f2);
        let f21 = f2 - 1.0;

        let ff4 = df * 0.25;
        let ulen: f64 = if df <= DHAF {
            1.0
        } else if df <= DQUAR {
            0.5
        } else if df <= DEIGH {
            0.25
        } else {
            0.125
        };

        f2lf += ulen.ln();

        let mut ans: f64 = 0.0;
        let mut otsum: f64 = 0.0;

        for i in 1..=50 {
            otsum = 0.0;
            let twa1 = (2 * i - 1) as f64 * ulen;

            for jj in 1..=NLEGQ {
                let (j, upper) = if IHALFQ < jj {
                    (jj - IHALFQ - 1, true)
                } else {
                    (jj - 1, false)
                };
                let offset = XLEGQ[j] * ulen;

                let t1 = if upper {
                    f2lf + f21 * (twa1 + offset).ln() - (offset + twa1) * ff4
                } else {
                    f2lf + f21 * (twa1 - offset).ln() + (offset - twa1) * ff4
                };

                // exp(t1) < 9e-14 does not contribute
                if t1 >= EPS1 {
                    let qsqz = if upper {
                        q * ((offset + twa1) * 0.5).sqrt()
                    } else {
                        q * ((twa1 - offset) * 0.5).sqrt()
                    };

                    let wprb = Self::wprob(qsqz, rr, cc);
                    otsum += wprb * ALEGQ[j] * t1.exp();
                }
            }

            // At least 1 / ulen intervals are always integrated so that the
            // left tail is not cut short
            if i as f64 * ulen >= 1.0 && otsum <= EPS2 {
                break;
            }

            ans += otsum;
        }

        if otsum > EPS2 {
            log::warn!(
                "Studentized range quadrature did not converge (q = {}, k = {}, df = {})",
                q,
                cc,
                df
            );
        }

        ans.min(1.0)
    }
}

impl Distribution for StudentizedRange {
    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        Self::ptukey(x, 1.0, self.k, self.df)
    }

    fn inverse_cdf(&self, p: f64) -> f64 {
        if !(0.0..=1.0).contains(&p) {
            return f64::NAN;
        }
        if p == 0.0 {
            return 0.0;
        }
        if p == 1.0 {
            return f64::INFINITY;
        }

        let mut hi = 8.0;
        while self.cdf(hi) < p && hi < 1e6 {
            hi *= 2.0;
        }
        let mut lo = 0.0;
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            if self.cdf(mid) < p {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo < 1e-10 {
                break;
            }
        }
        0.5 * (lo + hi)
    }
}

/// Noncentral t distribution
///
/// The CDF integrates `Phi(t * u - nc)` against the density of
/// `u = sqrt(chi2(df) / df)`.
#[derive(Debug, Clone)]
pub struct NoncentralT {
    pub df: f64,
    pub nc: f64,
}

impl NoncentralT {
    pub fn new(df: f64, nc: f64) -> Result<Self> {
        if !(df > 0.0) {
            return Err(Error::InvalidValue(format!(
                "Degrees of freedom must be positive, got {}",
                df
            )));
        }
        if !nc.is_finite() {
            return Err(Error::InvalidValue(
                "Noncentrality parameter must be finite".into(),
            ));
        }
        Ok(Self { df, nc })
    }
}

impl Distribution for NoncentralT {
    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x == f64::INFINITY {
            return 1.0;
        }
        if x == f64::NEG_INFINITY {
            return 0.0;
        }

        let df = self.df;
        if df > 1e7 {
            return normal_cdf(x - self.nc);
        }

        let half_df = df / 2.0;
        let log_norm = LN_2 + half_df * half_df.ln() - ln_gamma(half_df);

        let spread = 1.0 / (2.0 * df).sqrt();
        let lower = (1.0 - 12.0 * spread).max(0.0);
        let upper = 1.0 + 12.0 * spread;

        let rule = GaussLegendre::new(32);
        let integral = rule.integrate(
            |u| {
                if u <= 0.0 {
                    return 0.0;
                }
                let log_density = log_norm + (df - 1.0) * u.ln() - df * u * u / 2.0;
                log_density.exp() * normal_cdf(x * u - self.nc)
            },
            lower,
            upper,
            24,
        );

        integral.clamp(0.0, 1.0)
    }

    fn inverse_cdf(&self, p: f64) -> f64 {
        if !(0.0..=1.0).contains(&p) {
            return f64::NAN;
        }
        if p == 0.0 {
            return f64::NEG_INFINITY;
        }
        if p == 1.0 {
            return f64::INFINITY;
        }

        let mut lo = self.nc - 10.0;
        let mut hi = self.nc + 10.0;
        while self.cdf(lo) > p {
            lo -= 2.0 * (hi - lo);
        }
        while self.cdf(hi) < p {
            hi += 2.0 * (hi - lo);
        }
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            if self.cdf(mid) < p {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo < 1e-10 {
                break;
            }
        }
        0.5 * (lo + hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_helpers() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((normal_cdf(1.959963984540054) - 0.975).abs() < 1e-9);
        assert!((normal_sf(1.959963984540054) - 0.025).abs() < 1e-9);
        assert!((normal_ppf(0.975) - 1.959963984540054).abs() < 1e-9);
    }

    #[test]
    fn test_t_helpers() {
        // Two-sided p-value of t = -2 with 8 degrees of freedom
        let p = 2.0 * t_sf(2.0, 8.0).unwrap();
        assert!((p - 0.080516).abs() < 1e-5);
        assert!(t_sf(1.0, 0.0).is_err());
        assert!(t_sf(f64::NAN, 5.0).unwrap().is_nan());
    }

    #[test]
    fn test_studentized_range_two_means_matches_t() {
        // With two means, Q = sqrt(2) * |T|
        for &(q, df) in &[(1.0, 5.0), (2.5, 10.0), (3.7, 20.0), (4.2, 60.0)] {
            let dist = StudentizedRange::new(2.0, df).unwrap();
            let expected = 1.0 - 2.0 * t_sf(q / SQRT_2, df).unwrap();
            assert!(
                (dist.cdf(q) - expected).abs() < 1e-6,
                "q = {}, df = {}: {} vs {}",
                q,
                df,
                dist.cdf(q),
                expected
            );
        }
    }

    #[test]
    fn test_studentized_range_large_df_intervals() {
        // One df per integration interval width, plus the infinite-df limit
        for &df in &[80.0, 500.0, 2000.0, 10000.0, 30000.0] {
            let dist = StudentizedRange::new(2.0, df).unwrap();
            for &q in &[1.2, 2.8, 4.0] {
                let expected = 1.0 - 2.0 * t_sf(q / SQRT_2, df).unwrap();
                assert!(
                    (dist.cdf(q) - expected).abs() < 5e-5,
                    "q = {}, df = {}: {} vs {}",
                    q,
                    df,
                    dist.cdf(q),
                    expected
                );
            }
        }
    }

    #[test]
    fn test_studentized_range_table_values() {
        // Upper 5% points from standard tables
        let dist = StudentizedRange::new(3.0, 12.0).unwrap();
        assert!((dist.cdf(3.773) - 0.95).abs() < 1e-3);

        let dist = StudentizedRange::new(4.0, 15.0).unwrap();
        assert!((dist.cdf(4.076) - 0.95).abs() < 1e-3);

        let q = dist.inverse_cdf(0.95);
        assert!((q - 4.076).abs() < 0.01);
    }

    #[test]
    fn test_studentized_range_edges() {
        let dist = StudentizedRange::new(3.0, 10.0).unwrap();
        assert_eq!(dist.cdf(0.0), 0.0);
        assert_eq!(dist.cdf(f64::INFINITY), 1.0);
        assert!(dist.sf(0.5) > 0.9);
        assert!(StudentizedRange::new(1.0, 10.0).is_err());
        assert!(StudentizedRange::new(3.0, 0.5).is_err());
    }

    #[test]
    fn test_noncentral_t_reduces_to_t() {
        let dist = NoncentralT::new(10.0, 0.0).unwrap();
        let t = students_t(10.0).unwrap();
        for &x in &[-2.0, -0.5, 0.0, 1.0, 2.5] {
            assert!((dist.cdf(x) - t.cdf(x)).abs() < 1e-7, "x = {}", x);
        }
    }

    #[test]
    fn test_noncentral_t_shift() {
        let dist = NoncentralT::new(30.0, 2.0).unwrap();
        // Median sits close to the noncentrality parameter
        assert!((dist.cdf(2.0) - 0.5).abs() < 0.05);
        assert!(dist.cdf(0.0) < 0.05);
        let x = dist.inverse_cdf(0.5);
        assert!((dist.cdf(x) - 0.5).abs() < 1e-6);
    }
}
