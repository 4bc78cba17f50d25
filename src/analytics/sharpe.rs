/// Minimum number of monthly observations before a Sharpe ratio is reported.
pub const MIN_MONTHS: usize = 6;

/// Annualized Sharpe ratio from monthly returns.
///
/// Return leg is the geometric annual return `growth^(12/n) - 1`;
/// risk leg is the sample standard deviation scaled by √12.
/// Returns 0.0 with fewer than [`MIN_MONTHS`] observations or zero volatility.
pub fn sharpe_ratio(monthly_returns: &[f64], rf_annual: f64) -> f64 {
    let n = monthly_returns.len();
    if n < MIN_MONTHS {
        return 0.0;
    }

    let growth: f64 = monthly_returns.iter().map(|r| 1.0 + r).product();
    let n_years = n as f64 / 12.0;
    let ann_ret = growth.powf(1.0 / n_years) - 1.0;

    let ann_vol = sample_std(monthly_returns) * 12f64.sqrt();

    if ann_vol > 0.0 {
        (ann_ret - rf_annual) / ann_vol
    } else {
        0.0
    }
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values.iter().map(|r| (r - mean).powi(2)).sum();
    let denom = if n > 1 { (n - 1) as f64 } else { 1.0 };
    (ss / denom).sqrt()
}
