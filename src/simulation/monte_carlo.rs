//! Dartboard Monte Carlo: random portfolios scored by Sharpe ratio.
//!
//! Every draw picks `n_stocks` distinct tickers and evaluates them twice:
//! equal weighted (the "dartboard") and weighted by previous-month market
//! cap (the "index proxy"). Draws are generated up front from a single
//! seeded RNG, then scored in parallel via Rayon, so results are identical
//! for a given seed regardless of thread count.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;

use crate::analytics::sharpe::sharpe_ratio;
use crate::error::{DartboardError, Result};
use crate::models::panel::ReturnPanel;
use crate::models::results::SimulationResult;

/// Number of draws whose tickers are kept for inspection.
pub const SAMPLE_PORTFOLIOS: usize = 5;
/// Progress is reported after each batch of this many simulations.
const PROGRESS_EVERY: usize = 25;

#[derive(Debug, Clone)]
pub struct MonteCarloConfig {
    pub n_sims: usize,
    pub n_stocks: usize,
    pub rf_rate: f64,
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            n_sims: 500,
            n_stocks: 30,
            rf_rate: 0.03,
            seed: None,
        }
    }
}

/// Progress sink receiving the completed fraction in [0, 1].
pub type Progress<'a> = Option<&'a (dyn Fn(f64) + Sync)>;

pub fn run_monte_carlo(
    panel: &ReturnPanel,
    config: &MonteCarloConfig,
    progress: Progress<'_>,
) -> Result<SimulationResult> {
    let n_tickers = panel.n_tickers();
    if config.n_sims == 0 {
        return Err(DartboardError::invalid_parameter("n_sims must be positive"));
    }
    if config.n_stocks == 0 || config.n_stocks > n_tickers {
        return Err(DartboardError::invalid_parameter(format!(
            "cannot draw {} stocks from {} tickers",
            config.n_stocks, n_tickers
        )));
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let draws: Vec<Vec<usize>> = (0..config.n_sims)
        .map(|_| rand::seq::index::sample(&mut rng, n_tickers, config.n_stocks).into_vec())
        .collect();

    let lagged_caps = panel.lagged_caps();
    let score = |idxs: &Vec<usize>| {
        let ew = equal_weight_returns(&panel.returns, idxs);
        let cw = cap_weight_returns(&panel.returns, &lagged_caps, idxs);
        (sharpe_ratio(&ew, config.rf_rate), sharpe_ratio(&cw, config.rf_rate))
    };

    // Batches keep progress monotonic; without a sink everything runs as one batch.
    let batch = if progress.is_some() { PROGRESS_EVERY } else { draws.len() };
    let mut scores: Vec<(f64, f64)> = Vec::with_capacity(draws.len());
    for chunk in draws.chunks(batch) {
        scores.par_extend(chunk.par_iter().map(&score));
        if let Some(report) = progress {
            if scores.len() < config.n_sims {
                report(scores.len() as f64 / config.n_sims as f64);
            }
        }
    }

    if let Some(report) = progress {
        report(1.0);
    }

    let sample_portfolios = draws
        .iter()
        .take(SAMPLE_PORTFOLIOS)
        .map(|idxs| idxs.iter().map(|&i| panel.tickers[i].clone()).collect())
        .collect();

    let (equal_weight, cap_weight): (Vec<f64>, Vec<f64>) = scores.into_iter().unzip();
    debug!(
        "Monte Carlo done: sims={} stocks={} months={}",
        config.n_sims,
        config.n_stocks,
        panel.n_dates()
    );

    Ok(SimulationResult {
        equal_weight,
        cap_weight,
        sample_portfolios,
    })
}

/// Monthly return of an equally weighted basket.
pub fn equal_weight_returns(returns: &[Vec<f64>], idxs: &[usize]) -> Vec<f64> {
    let k = idxs.len() as f64;
    returns
        .iter()
        .map(|row| idxs.iter().map(|&i| row[i]).sum::<f64>() / k)
        .collect()
}

/// Monthly return weighted by lagged market cap. Months where the basket's
/// lagged cap sums to zero (including the first month) return 0.
pub fn cap_weight_returns(
    returns: &[Vec<f64>],
    lagged_caps: &[Vec<f64>],
    idxs: &[usize],
) -> Vec<f64> {
    returns
        .iter()
        .zip(lagged_caps)
        .map(|(ret_row, cap_row)| {
            let total: f64 = idxs.iter().map(|&i| cap_row[i]).sum();
            if total > 0.0 {
                idxs.iter().map(|&i| cap_row[i] / total * ret_row[i]).sum()
            } else {
                0.0
            }
        })
        .collect()
}
