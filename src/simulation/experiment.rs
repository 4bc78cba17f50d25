//! End-to-end dartboard experiment for one market era.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analytics::stats::{bootstrap_ci, compute_statistics, test_ew_vs_cw, test_vs_benchmark};
use crate::config::Config;
use crate::feeds::yahoo::YahooClient;
use crate::models::era::MarketEra;
use crate::models::panel::ReturnPanel;
use crate::models::results::{BenchmarkStats, BenchmarkTest, PairedTest, SimulationResult, SummaryStats};
use crate::simulation::monte_carlo::{run_monte_carlo, MonteCarloConfig};

/// An era needs at least a year of months to say anything.
pub const MIN_PERIOD_MONTHS: usize = 12;
pub const BOOTSTRAP_SAMPLES: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub benchmark: BenchmarkStats,
    /// One-sample test of the equal-weight Sharpes against the benchmark Sharpe.
    pub ew_test: BenchmarkTest,
    /// % of dartboards with a strictly higher Sharpe than the benchmark.
    pub ew_win_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub era: MarketEra,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub months: usize,
    pub universe: usize,
    pub n_sims: usize,
    pub n_stocks: usize,
    pub rf_rate: f64,
    pub simulation: SimulationResult,
    pub ew_stats: SummaryStats,
    pub cw_stats: SummaryStats,
    pub ew_vs_cw: PairedTest,
    pub ew_bootstrap_ci: (f64, f64),
    pub benchmarks: Vec<BenchmarkComparison>,
}

impl ExperimentReport {
    /// `(display name, Sharpe)` pairs for charts and narrative.
    pub fn benchmark_markers(&self) -> Vec<(String, f64)> {
        self.benchmarks
            .iter()
            .map(|b| {
                (
                    format!("{} ({})", b.benchmark.name, b.benchmark.ticker),
                    b.benchmark.sharpe,
                )
            })
            .collect()
    }
}

pub struct Experiment;

impl Experiment {
    /// Run the experiment configured in `config` against `panel`.
    ///
    /// `client` is `None` in offline mode: the risk-free rate falls back to the
    /// configured default and no benchmarks are compared.
    pub async fn run(
        config: &Config,
        panel: &ReturnPanel,
        client: Option<&YahooClient>,
    ) -> Result<ExperimentReport> {
        let era = config.simulation.era;
        let (start, end) = era
            .bounds(panel)
            .context("panel has no dates")?;
        let sub = panel.slice(start, end);

        anyhow::ensure!(
            sub.n_dates() >= MIN_PERIOD_MONTHS,
            "Period too short: {} has {} months, need {MIN_PERIOD_MONTHS}",
            era.label(),
            sub.n_dates()
        );
        info!("{}: {start} → {end}, {} months", era.label(), sub.n_dates());

        let client = client.filter(|_| !config.benchmark.offline);

        let rf_rate = match (config.benchmark.forced_rf_rate, client) {
            (Some(rf), _) => rf,
            (None, Some(c)) => c.risk_free_rate(start, end).await,
            (None, None) => config.benchmark.default_rf_rate,
        };
        info!("Risk-free rate: {:.2}% (avg 13-wk T-bill)", rf_rate * 100.0);

        let mut fetched = Vec::new();
        match client {
            Some(c) => {
                for (ticker, name) in &config.benchmark.tickers {
                    fetched.push(c.benchmark_stats(ticker, name, start, end, rf_rate).await);
                }
            }
            None => warn!("Offline: skipping benchmark comparison"),
        }

        let mc = MonteCarloConfig {
            n_sims: config.simulation.n_sims,
            n_stocks: config.simulation.n_stocks,
            rf_rate,
            seed: config.simulation.seed,
        };

        // Monte Carlo and analytics are CPU bound; keep them off the async workers.
        tokio::task::spawn_blocking(move || Self::evaluate(era, (start, end), sub, mc, fetched))
            .await
            .context("simulation task failed")?
    }

    /// Monte Carlo plus analytics over an already sliced era panel.
    /// `bounds` are the era's calendar bounds used for the slice.
    pub fn evaluate(
        era: MarketEra,
        bounds: (NaiveDate, NaiveDate),
        sub: ReturnPanel,
        mc: MonteCarloConfig,
        fetched: Vec<BenchmarkStats>,
    ) -> Result<ExperimentReport> {
        let (start, end) = bounds;
        let report_progress = |p: f64| debug!("Simulation progress {:.0}%", p * 100.0);
        let simulation = run_monte_carlo(&sub, &mc, Some(&report_progress))?;

        let ew_stats = compute_statistics(&simulation.equal_weight)?;
        let cw_stats = compute_statistics(&simulation.cap_weight)?;
        let ew_vs_cw = test_ew_vs_cw(&simulation.equal_weight, &simulation.cap_weight)?;

        let mut rng = match mc.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        let ew_bootstrap_ci = bootstrap_ci(&simulation.equal_weight, BOOTSTRAP_SAMPLES, 0.95, &mut rng)?;

        let mut benchmarks = Vec::with_capacity(fetched.len());
        for benchmark in fetched {
            let ew_test = test_vs_benchmark(&simulation.equal_weight, benchmark.sharpe)?;
            let wins = simulation
                .equal_weight
                .iter()
                .filter(|&&s| s > benchmark.sharpe)
                .count();
            benchmarks.push(BenchmarkComparison {
                ew_win_rate: wins as f64 / simulation.len() as f64 * 100.0,
                benchmark,
                ew_test,
            });
        }

        Ok(ExperimentReport {
            era,
            start,
            end,
            months: sub.n_dates(),
            universe: sub.n_tickers(),
            n_sims: mc.n_sims,
            n_stocks: mc.n_stocks,
            rf_rate: mc.rf_rate,
            simulation,
            ew_stats,
            cw_stats,
            ew_vs_cw,
            ew_bootstrap_ci,
            benchmarks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn era_panel(n_months: usize, n_tickers: usize) -> ReturnPanel {
        let start = NaiveDate::from_ymd_opt(2007, 10, 31).unwrap();
        let dates = (0..n_months)
            .map(|m| start + chrono::Months::new(m as u32))
            .collect();
        let tickers = (0..n_tickers).map(|t| format!("X{t:02}")).collect();
        let returns = (0..n_months)
            .map(|m| {
                (0..n_tickers)
                    .map(|t| ((m * 5 + t * 11) % 13) as f64 / 100.0 - 0.05)
                    .collect()
            })
            .collect();
        let caps = (0..n_months)
            .map(|_| (0..n_tickers).map(|t| 500.0 + 100.0 * t as f64).collect())
            .collect();
        ReturnPanel::new(dates, tickers, returns, caps)
    }

    #[test]
    fn test_evaluate_runs_without_runtime() {
        let sub = era_panel(18, 25);
        let bounds = (sub.first_date().unwrap(), sub.last_date().unwrap());
        let mc = MonteCarloConfig { n_sims: 150, n_stocks: 10, rf_rate: 0.02, seed: Some(8) };
        let benchmarks = vec![
            BenchmarkStats { ticker: "LOW".into(), name: "Floor".into(), sharpe: -1e9, annual_return: 0.0 },
            BenchmarkStats { ticker: "HIGH".into(), name: "Ceiling".into(), sharpe: 1e9, annual_return: 0.0 },
        ];

        let report = Experiment::evaluate(MarketEra::FinancialCrisis, bounds, sub, mc, benchmarks).unwrap();

        assert_eq!(report.months, 18);
        assert_eq!(report.universe, 25);
        assert_eq!(report.simulation.len(), 150);
        assert_eq!(report.start, bounds.0);
        assert!((report.rf_rate - 0.02).abs() < 1e-12);
        assert_eq!(report.benchmarks[0].ew_win_rate, 100.0, "every draw beats the floor");
        assert_eq!(report.benchmarks[1].ew_win_rate, 0.0, "no draw beats the ceiling");
        assert_eq!(report.benchmark_markers()[1].0, "Ceiling (HIGH)");
    }
}
