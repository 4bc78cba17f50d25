//! Plain-language interpretation of a simulation run, derived from its actual output.

use std::fmt::Write;

use crate::analytics::stats::{mean, percentile_sorted, std_dev};

/// Minimum finite draws per series before the distribution is described.
pub const MIN_VALID: usize = 10;

/// Where a value sits inside a distribution, from its percentile rank.
pub fn tail_label(pct: f64) -> &'static str {
    match pct {
        p if p >= 95.0 => "extreme right tail",
        p if p >= 85.0 => "right tail",
        p if p >= 65.0 => "upper half",
        p if p >= 35.0 => "middle",
        p if p >= 15.0 => "lower half",
        p if p >= 5.0 => "left tail",
        _ => "extreme left tail",
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DistributionSummary {
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub q10: f64,
    pub q25: f64,
    pub q75: f64,
    pub q90: f64,
    pub iqr: f64,
}

impl DistributionSummary {
    /// Expects at least one finite value.
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let q25 = percentile_sorted(&sorted, 25.0);
        let q75 = percentile_sorted(&sorted, 75.0);
        Self {
            n: sorted.len(),
            mean: mean(&sorted),
            median: percentile_sorted(&sorted, 50.0),
            std: if sorted.len() > 1 { std_dev(&sorted, 1) } else { 0.0 },
            q10: percentile_sorted(&sorted, 10.0),
            q25,
            q75,
            q90: percentile_sorted(&sorted, 90.0),
            iqr: q75 - q25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BenchmarkPosition {
    pub name: String,
    pub sharpe: f64,
    /// Percentile of the benchmark inside each distribution (% of draws ≤ benchmark).
    pub ew_percentile: f64,
    pub cw_percentile: f64,
    /// % of draws at or above the benchmark.
    pub ew_beat_pct: f64,
    pub cw_beat_pct: f64,
}

impl BenchmarkPosition {
    pub fn locate(name: &str, sharpe: f64, ew: &[f64], cw: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            sharpe,
            ew_percentile: share(ew, |x| x <= sharpe),
            cw_percentile: share(cw, |x| x <= sharpe),
            ew_beat_pct: share(ew, |x| x >= sharpe),
            cw_beat_pct: share(cw, |x| x >= sharpe),
        }
    }
}

fn share(values: &[f64], pred: impl Fn(f64) -> bool) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&x| pred(x)).count() as f64 / values.len() as f64 * 100.0
}

/// Build the interpretation text for one run.
///
/// `benchmarks` are `(display name, Sharpe)` pairs; non-finite Sharpes are skipped.
pub fn describe_distribution(
    res_ew: &[f64],
    res_cw: &[f64],
    benchmarks: &[(String, f64)],
    era_label: &str,
) -> String {
    let ew: Vec<f64> = res_ew.iter().copied().filter(|x| x.is_finite()).collect();
    let cw: Vec<f64> = res_cw.iter().copied().filter(|x| x.is_finite()).collect();

    let header = if era_label.is_empty() {
        String::new()
    } else {
        format!(" ({era_label})")
    };
    let mut out = format!("Interpreting the Simulation Results{header}\n");

    if ew.len() < MIN_VALID || cw.len() < MIN_VALID {
        out.push_str(
            "Not enough valid simulation output to generate a reliable distribution summary.\n",
        );
        return out;
    }

    let ews = DistributionSummary::from_values(&ew);
    let cws = DistributionSummary::from_values(&cw);

    let n_pair = ew.len().min(cw.len());
    let pair_win = share_pairs(&ew[..n_pair], &cw[..n_pair]);

    out.push_str(
        "Each histogram is the distribution of Sharpe ratios from repeated random portfolios over the \
selected period. A wide distribution means outcomes depend heavily on which stocks were drawn, \
not just on the weighting scheme.\n\n",
    );
    let _ = writeln!(out, "Distribution summary:");
    for (label, s) in [("Dartboard (Equal-Weight)", ews), ("Index Proxy (Cap-Weight)", cws)] {
        let _ = writeln!(
            out,
            "  - {label}: mean = {:.2}, median = {:.2}, middle 50% = [{:.2}, {:.2}] (IQR = {:.2}), \
10-90% range = [{:.2}, {:.2}]",
            s.mean, s.median, s.q25, s.q75, s.iqr, s.q10, s.q90
        );
    }

    let _ = writeln!(
        out,
        "\nEqual-weight vs cap-weight: the equal-weight portfolio beats the cap-weight proxy in \
{pair_win:.0}% of paired simulations. This is not skill; it reflects systematic differences in \
exposure (often size and rebalancing effects)."
    );

    let positions: Vec<BenchmarkPosition> = benchmarks
        .iter()
        .filter(|(_, sharpe)| sharpe.is_finite())
        .map(|(name, sharpe)| BenchmarkPosition::locate(name, *sharpe, &ew, &cw))
        .collect();

    if !positions.is_empty() {
        let _ = writeln!(out, "\nBenchmark positioning:");
        for p in &positions {
            let _ = writeln!(
                out,
                "  - {} Sharpe = {:.2}: sits in the {} of the Dartboard distribution \
(~{:.0}th percentile; {:.0}% of dartboards beat it) and the {} of the Index Proxy distribution \
(~{:.0}th percentile; {:.0}% beat it).",
                p.name,
                p.sharpe,
                tail_label(p.ew_percentile),
                p.ew_percentile,
                p.ew_beat_pct,
                tail_label(p.cw_percentile),
                p.cw_percentile,
                p.cw_beat_pct
            );
        }
    }

    out.push_str(
        "\nOver the chosen window, randomly diversified portfolios produce a broad spread of \
risk-adjusted outcomes. A benchmark in the right tail is hard to match; one near the middle is \
matched by many random draws.\n",
    );
    out
}

fn share_pairs(ew: &[f64], cw: &[f64]) -> f64 {
    if ew.is_empty() {
        return 0.0;
    }
    ew.iter().zip(cw).filter(|(e, c)| e > c).count() as f64 / ew.len() as f64 * 100.0
}
