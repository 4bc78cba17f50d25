use tracing::info;

use crate::analytics::stats::mean;
use crate::error::{DartboardError, Result};
use crate::models::panel::ReturnPanel;
use crate::models::results::RollingWindow;
use crate::simulation::monte_carlo::{run_monte_carlo, MonteCarloConfig};

const STEP_MONTHS: usize = 12;

#[derive(Debug, Clone)]
pub struct RollingParams {
    pub window_years: usize,
    pub n_sims: usize,
    pub n_stocks: usize,
    pub rf_rate: f64,
    pub seed: Option<u64>,
}

impl Default for RollingParams {
    fn default() -> Self {
        Self {
            window_years: 5,
            n_sims: 100,
            n_stocks: 30,
            rf_rate: 0.03,
            seed: None,
        }
    }
}

/// Re-run the experiment over windows of `window_years`, sliding by one year.
///
/// A panel no longer than one window yields no rows.
pub fn run_rolling_analysis(panel: &ReturnPanel, config: &RollingParams) -> Result<Vec<RollingWindow>> {
    if config.window_years == 0 {
        return Err(DartboardError::invalid_parameter("window_years must be positive"));
    }
    let window_months = config.window_years.checked_mul(12).ok_or_else(|| {
        DartboardError::invalid_parameter(format!("window_years {} is too large", config.window_years))
    })?;
    let n_dates = panel.n_dates();

    let mut rows = Vec::new();
    for (k, start_idx) in (0..n_dates.saturating_sub(window_months))
        .step_by(STEP_MONTHS)
        .enumerate()
    {
        let end_idx = start_idx + window_months;
        let window = panel.window(start_idx, end_idx);

        let mc = MonteCarloConfig {
            n_sims: config.n_sims,
            n_stocks: config.n_stocks,
            rf_rate: config.rf_rate,
            seed: config.seed.map(|s| s.wrapping_add(k as u64)),
        };
        let result = run_monte_carlo(&window, &mc, None)?;

        let row = RollingWindow {
            start_date: panel.dates[start_idx],
            end_date: panel.dates[end_idx - 1],
            ew_mean: mean(&result.equal_weight),
            cw_mean: mean(&result.cap_weight),
            ew_win_rate: result.ew_win_rate(),
        };
        info!(
            "Window {} → {}: EW={:.2} CW={:.2} EW wins {:.0}%",
            row.start_date, row.end_date, row.ew_mean, row.cw_mean, row.ew_win_rate
        );
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn panel(n_months: usize) -> ReturnPanel {
        let start = NaiveDate::from_ymd_opt(2000, 1, 31).unwrap();
        let dates = (0..n_months)
            .map(|m| start + chrono::Months::new(m as u32))
            .collect();
        let tickers = (0..15).map(|t| format!("S{t}")).collect();
        let returns = (0..n_months)
            .map(|m| (0..15).map(|t| ((m + 3 * t) % 9) as f64 / 100.0 - 0.03).collect())
            .collect();
        let caps = (0..n_months)
            .map(|m| (0..15).map(|t| 100.0 + (m * t) as f64).collect())
            .collect();
        ReturnPanel::new(dates, tickers, returns, caps)
    }

    #[test]
    fn test_window_count_and_dates() {
        // 84 months, 5y windows: starts at 0, 12 (24 would be the exclusive bound)
        let p = panel(84);
        let config = RollingParams { n_sims: 20, n_stocks: 10, seed: Some(5), ..Default::default() };
        let rows = run_rolling_analysis(&p, &config).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].start_date, p.dates[0]);
        assert_eq!(rows[0].end_date, p.dates[59]);
        assert_eq!(rows[1].start_date, p.dates[12]);
        assert_eq!(rows[1].end_date, p.dates[71]);
        for row in &rows {
            assert!((0.0..=100.0).contains(&row.ew_win_rate));
        }
    }

    #[test]
    fn test_panel_equal_to_window_yields_nothing() {
        let p = panel(60);
        let config = RollingParams { n_sims: 10, n_stocks: 10, ..Default::default() };
        assert!(run_rolling_analysis(&p, &config).unwrap().is_empty());
    }

    #[test]
    fn test_zero_window_rejected() {
        let p = panel(24);
        let config = RollingParams { window_years: 0, ..Default::default() };
        assert!(run_rolling_analysis(&p, &config).is_err());
    }

    #[test]
    fn test_oversized_window_rejected() {
        let p = panel(24);
        let config = RollingParams { window_years: usize::MAX, ..Default::default() };
        let err = run_rolling_analysis(&p, &config).unwrap_err();
        assert!(matches!(err, DartboardError::InvalidParameter { .. }), "got {err}");
    }

    #[test]
    fn test_seed_offset_per_window() {
        let p = panel(84);
        let config = RollingParams { n_sims: 20, n_stocks: 10, seed: Some(5), ..Default::default() };
        let rows = run_rolling_analysis(&p, &config).unwrap();

        for (k, start) in [(0usize, 0usize), (1, 12)] {
            let mc = MonteCarloConfig {
                n_sims: 20,
                n_stocks: 10,
                rf_rate: config.rf_rate,
                seed: Some(5 + k as u64),
            };
            let expected = run_monte_carlo(&p.window(start, start + 60), &mc, None).unwrap();
            assert_eq!(rows[k].ew_mean, mean(&expected.equal_weight), "window {k}");
            assert_eq!(rows[k].cw_mean, mean(&expected.cap_weight), "window {k}");
        }
    }
}
