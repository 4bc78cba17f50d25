use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sharpe ratios of every simulated portfolio, in draw order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub equal_weight: Vec<f64>,
    pub cap_weight: Vec<f64>,
    /// Tickers of the first few draws, for inspection.
    pub sample_portfolios: Vec<Vec<String>>,
}

impl SimulationResult {
    pub fn len(&self) -> usize {
        self.equal_weight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equal_weight.is_empty()
    }

    /// Percentage of draws where equal weight beat cap weight.
    pub fn ew_win_rate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let wins = self
            .equal_weight
            .iter()
            .zip(&self.cap_weight)
            .filter(|(ew, cw)| ew > cw)
            .count();
        wins as f64 / self.len() as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub std: f64,
    pub se: f64,
    pub ci_95_low: f64,
    pub ci_95_high: f64,
    pub p5: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PairedTest {
    pub t_stat: f64,
    pub p_value: f64,
    pub cohens_d: f64,
    pub significant: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BenchmarkTest {
    pub t_stat: f64,
    pub p_value: f64,
    pub significant: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkStats {
    pub ticker: String,
    pub name: String,
    pub sharpe: f64,
    pub annual_return: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub ew_mean: f64,
    pub cw_mean: f64,
    pub ew_win_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_rate() {
        let result = SimulationResult {
            equal_weight: vec![1.0, 0.5, 0.2, 0.9],
            cap_weight: vec![0.5, 0.5, 0.4, 0.1],
            sample_portfolios: vec![],
        };
        assert!((result.ew_win_rate() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_win_rate_empty() {
        let result = SimulationResult {
            equal_weight: vec![],
            cap_weight: vec![],
            sample_portfolios: vec![],
        };
        assert_eq!(result.ew_win_rate(), 0.0);
    }
}
