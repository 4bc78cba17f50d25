//! Descriptive statistics and hypothesis tests over simulated Sharpe ratios.

use rand::Rng;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{DartboardError, Result};
use crate::models::results::{BenchmarkTest, PairedTest, SummaryStats};

const SIGNIFICANCE: f64 = 0.05;

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with `ddof` delta degrees of freedom (0 = population, 1 = sample).
pub fn std_dev(values: &[f64], ddof: usize) -> f64 {
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - ddof) as f64).sqrt()
}

/// Percentile `p` in [0, 100] using linear interpolation between closest ranks.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(&sorted, p)
}

/// Same as [`percentile`] for data that is already sorted ascending.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Mean, dispersion, 95% Student-t confidence interval and percentiles.
pub fn compute_statistics(values: &[f64]) -> Result<SummaryStats> {
    let n = values.len();
    if n < 2 {
        return Err(DartboardError::insufficient_data(2, n));
    }

    let mean = mean(values);
    let std = std_dev(values, 1);
    let se = std / (n as f64).sqrt();
    let half_width = t_critical(0.975, (n - 1) as f64)? * se;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Ok(SummaryStats {
        mean,
        std,
        se,
        ci_95_low: mean - half_width,
        ci_95_high: mean + half_width,
        p5: percentile_sorted(&sorted, 5.0),
        p25: percentile_sorted(&sorted, 25.0),
        median: percentile_sorted(&sorted, 50.0),
        p75: percentile_sorted(&sorted, 75.0),
        p95: percentile_sorted(&sorted, 95.0),
    })
}

/// Paired t-test: does equal weight differ from cap weight on the same draws?
pub fn test_ew_vs_cw(res_ew: &[f64], res_cw: &[f64]) -> Result<PairedTest> {
    if res_ew.len() != res_cw.len() {
        return Err(DartboardError::length_mismatch(res_ew.len(), res_cw.len()));
    }

    let diffs: Vec<f64> = res_ew.iter().zip(res_cw).map(|(e, c)| e - c).collect();
    let (t_stat, p_value) = one_sample_t(&diffs, 0.0)?;

    let pooled = ((std_dev(res_ew, 0).powi(2) + std_dev(res_cw, 0).powi(2)) / 2.0).sqrt();
    let cohens_d = (mean(res_ew) - mean(res_cw)) / pooled;

    Ok(PairedTest {
        t_stat,
        p_value,
        cohens_d,
        significant: p_value < SIGNIFICANCE,
    })
}

/// One-sample t-test of the simulated Sharpe ratios against a benchmark Sharpe.
pub fn test_vs_benchmark(values: &[f64], benchmark_sharpe: f64) -> Result<BenchmarkTest> {
    let (t_stat, p_value) = one_sample_t(values, benchmark_sharpe)?;
    Ok(BenchmarkTest {
        t_stat,
        p_value,
        significant: p_value < SIGNIFICANCE,
    })
}

/// Percentile bootstrap confidence interval for the mean.
pub fn bootstrap_ci<R: Rng>(
    values: &[f64],
    n_bootstrap: usize,
    confidence: f64,
    rng: &mut R,
) -> Result<(f64, f64)> {
    if values.is_empty() {
        return Err(DartboardError::insufficient_data(1, 0));
    }
    if n_bootstrap == 0 {
        return Err(DartboardError::invalid_parameter("n_bootstrap must be positive"));
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(DartboardError::invalid_parameter(format!(
            "confidence must be in (0, 1), got {confidence}"
        )));
    }

    let n = values.len();
    let mut boot_means: Vec<f64> = (0..n_bootstrap)
        .map(|_| (0..n).map(|_| values[rng.gen_range(0..n)]).sum::<f64>() / n as f64)
        .collect();
    boot_means.sort_by(|a, b| a.total_cmp(b));

    let lower = percentile_sorted(&boot_means, (1.0 - confidence) / 2.0 * 100.0);
    let upper = percentile_sorted(&boot_means, (1.0 + confidence) / 2.0 * 100.0);
    Ok((lower, upper))
}

/// Two-sided one-sample t-test. Zero-variance samples give t = ±inf (p = 0)
/// or, when the mean equals `mu`, t = NaN (p = NaN).
fn one_sample_t(values: &[f64], mu: f64) -> Result<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return Err(DartboardError::insufficient_data(2, n));
    }

    let se = std_dev(values, 1) / (n as f64).sqrt();
    let diff = mean(values) - mu;

    if se == 0.0 {
        return Ok(if diff == 0.0 {
            (f64::NAN, f64::NAN)
        } else {
            (diff.signum() * f64::INFINITY, 0.0)
        });
    }

    let t_stat = diff / se;
    let dist = students_t((n - 1) as f64)?;
    let p_value = (2.0 * (1.0 - dist.cdf(t_stat.abs()))).clamp(0.0, 1.0);
    Ok((t_stat, p_value))
}

fn t_critical(q: f64, df: f64) -> Result<f64> {
    Ok(students_t(df)?.inverse_cdf(q))
}

fn students_t(df: f64) -> Result<StudentsT> {
    StudentsT::new(0.0, 1.0, df)
        .map_err(|e| DartboardError::invalid_parameter(format!("Student-t df={df}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&v, 50.0) - 2.5).abs() < 1e-12);
        assert!((percentile(&v, 0.0) - 1.0).abs() < 1e-12);
        assert!((percentile(&v, 100.0) - 4.0).abs() < 1e-12);
        // rank = 0.25 * 3 = 0.75
        assert!((percentile(&v, 25.0) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_unsorted_input() {
        let v = [5.0, 1.0, 3.0];
        assert!((percentile(&v, 50.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_compute_statistics() {
        let v: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let s = compute_statistics(&v).unwrap();

        assert!((s.mean - 5.5).abs() < 1e-12);
        // Sample std of 1..=10
        assert!((s.std - 3.0276503540974917).abs() < 1e-9);
        assert!((s.se - s.std / 10f64.sqrt()).abs() < 1e-12);
        // t(0.975, 9) = 2.2621571627...
        let half = 2.262157162740992 * s.se;
        assert!((s.ci_95_low - (5.5 - half)).abs() < 1e-4, "ci low {}", s.ci_95_low);
        assert!((s.ci_95_high - (5.5 + half)).abs() < 1e-4, "ci high {}", s.ci_95_high);
        assert!((s.median - 5.5).abs() < 1e-12);
        assert!((s.p5 - 1.45).abs() < 1e-12);
        assert!((s.p95 - 9.55).abs() < 1e-12);
    }

    #[test]
    fn test_compute_statistics_needs_two() {
        assert!(compute_statistics(&[1.0]).is_err());
    }

    #[test]
    fn test_paired_clear_difference() {
        let ew: Vec<f64> = (0..50).map(|i| 0.6 + (i % 7) as f64 * 0.01).collect();
        let cw: Vec<f64> = (0..50).map(|i| 0.3 + (i % 5) as f64 * 0.01).collect();
        let t = test_ew_vs_cw(&ew, &cw).unwrap();
        assert!(t.t_stat > 10.0, "t = {}", t.t_stat);
        assert!(t.p_value < 1e-6);
        assert!(t.significant);
        assert!(t.cohens_d > 1.0);
    }

    #[test]
    fn test_paired_identical_samples() {
        let v = [0.1, 0.2, 0.3, 0.4];
        let t = test_ew_vs_cw(&v, &v).unwrap();
        assert!(t.t_stat.is_nan());
        assert!(t.p_value.is_nan());
        assert!(!t.significant);
    }

    #[test]
    fn test_paired_length_mismatch() {
        assert!(test_ew_vs_cw(&[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn test_vs_benchmark_known_value() {
        // mean 3, sample sd 1.5811, se 0.7071 -> t = (3 - 1) / 0.7071 = 2.8284
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        let t = test_vs_benchmark(&v, 1.0).unwrap();
        assert!((t.t_stat - 2.8284271247461903).abs() < 1e-9);
        // two-sided p for t=2.828, df=4 is ~0.0474
        assert!((t.p_value - 0.0474).abs() < 1e-3, "p = {}", t.p_value);
        assert!(t.significant);
    }

    #[test]
    fn test_vs_benchmark_not_significant() {
        let v = [0.4, 0.6, 0.5, 0.45, 0.55];
        let t = test_vs_benchmark(&v, 0.5).unwrap();
        assert!(t.t_stat.abs() < 1e-9);
        assert!((t.p_value - 1.0).abs() < 1e-9);
        assert!(!t.significant);
    }

    #[test]
    fn test_zero_variance_away_from_benchmark() {
        let above = test_vs_benchmark(&[0.5; 10], 0.3).unwrap();
        assert_eq!(above.t_stat, f64::INFINITY);
        assert_eq!(above.p_value, 0.0);
        assert!(above.significant);

        let below = test_vs_benchmark(&[0.25; 10], 0.3).unwrap();
        assert_eq!(below.t_stat, f64::NEG_INFINITY);
        assert_eq!(below.p_value, 0.0);
    }

    #[test]
    fn test_paired_constant_gap() {
        let ew = [1.5, 2.5, 3.5];
        let cw = [1.0, 2.0, 3.0];
        let t = test_ew_vs_cw(&ew, &cw).unwrap();
        assert_eq!(t.t_stat, f64::INFINITY);
        assert_eq!(t.p_value, 0.0);
        assert!(t.significant);
    }

    #[test]
    fn test_bootstrap_brackets_mean() {
        let mut rng = StdRng::seed_from_u64(7);
        let v: Vec<f64> = (0..200).map(|i| (i % 20) as f64 / 10.0).collect();
        let m = mean(&v);
        let (lo, hi) = bootstrap_ci(&v, 1000, 0.95, &mut rng).unwrap();
        assert!(lo < m && m < hi, "{lo} < {m} < {hi}");
        assert!(hi - lo < 0.5);
    }

    #[test]
    fn test_bootstrap_rejects_bad_confidence() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(bootstrap_ci(&[1.0, 2.0], 10, 1.5, &mut rng).is_err());
        assert!(bootstrap_ci(&[], 10, 0.95, &mut rng).is_err());
    }
}
