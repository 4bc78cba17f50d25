use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

use crate::models::results::RollingWindow;
use crate::report::histogram::{Histogram, DEFAULT_BINS};
use crate::report::narrative::describe_distribution;
use crate::simulation::experiment::ExperimentReport;

/// Portfolios shown in the inspection section, and tickers listed per portfolio.
const SHOWN_PORTFOLIOS: usize = 3;
const SHOWN_TICKERS: usize = 10;
const BAR_WIDTH: usize = 30;

/// Full console rendering: metrics, tests, histogram, narrative and sample darts.
pub fn render(report: &ExperimentReport) -> String {
    let mut out = String::new();
    let ew = &report.ew_stats;
    let cw = &report.cw_stats;

    let _ = writeln!(out, "=== THE DARTBOARD EXPERIMENT: {} ===", report.era.label());
    let _ = writeln!(
        out,
        "{} → {} | {} months | {} tickers | {} portfolios of {} darts",
        report.start, report.end, report.months, report.universe, report.n_sims, report.n_stocks
    );
    let _ = writeln!(out, "Risk-free rate: {:.2}%\n", report.rf_rate * 100.0);

    let headline = match report.benchmarks.first() {
        Some(b) => format!(
            "{:.2}  ({:.0}% beat {})",
            ew.mean, b.ew_win_rate, b.benchmark.ticker
        ),
        None => format!("{:.2}", ew.mean),
    };
    let _ = writeln!(out, "  Dartboard (Equal Wgt)   {headline}");
    let _ = writeln!(out, "  Index Proxy (Cap Wgt)   {:.2}", cw.mean);
    for b in &report.benchmarks {
        let _ = writeln!(
            out,
            "  {:<22}  {:.2}  (annual return {:.1}%)",
            format!("{} ({})", b.benchmark.name, b.benchmark.ticker),
            b.benchmark.sharpe,
            b.benchmark.annual_return * 100.0
        );
    }

    let _ = writeln!(out, "\n--- Statistics ---");
    for (label, s) in [("Equal weight", ew), ("Cap weight", cw)] {
        let _ = writeln!(
            out,
            "  {label:<13} mean={:.3} sd={:.3} se={:.4} 95% CI=[{:.3}, {:.3}] \
p5={:.2} p25={:.2} med={:.2} p75={:.2} p95={:.2}",
            s.mean, s.std, s.se, s.ci_95_low, s.ci_95_high, s.p5, s.p25, s.median, s.p75, s.p95
        );
    }
    let (lo, hi) = report.ew_bootstrap_ci;
    let _ = writeln!(out, "  Bootstrap 95% CI of EW mean: [{lo:.3}, {hi:.3}]");

    let t = &report.ew_vs_cw;
    let _ = writeln!(
        out,
        "  EW vs CW (paired t): t={:.2} p={:.4} d={:.2} {}",
        t.t_stat,
        t.p_value,
        t.cohens_d,
        significance(t.significant)
    );
    let _ = writeln!(
        out,
        "  EW beats CW in {:.0}% of draws",
        report.simulation.ew_win_rate()
    );
    for b in &report.benchmarks {
        let _ = writeln!(
            out,
            "  EW vs {} (one-sample t): t={:.2} p={:.4} {}",
            b.benchmark.ticker,
            b.ew_test.t_stat,
            b.ew_test.p_value,
            significance(b.ew_test.significant)
        );
    }

    let markers = report.benchmark_markers();
    let _ = writeln!(
        out,
        "\n--- Performance Distribution vs Benchmarks ({}) ---",
        report.era.label()
    );
    match Histogram::build(
        &report.simulation.equal_weight,
        &report.simulation.cap_weight,
        DEFAULT_BINS,
    ) {
        Some(h) => out.push_str(&h.render(&markers, BAR_WIDTH)),
        None => out.push_str("  (no finite Sharpe ratios to plot)\n"),
    }

    out.push('\n');
    out.push_str(&describe_distribution(
        &report.simulation.equal_weight,
        &report.simulation.cap_weight,
        &markers,
        report.era.label(),
    ));

    let _ = writeln!(out, "\n--- Inspect the Darts ---");
    for (i, portfolio) in report
        .simulation
        .sample_portfolios
        .iter()
        .take(SHOWN_PORTFOLIOS)
        .enumerate()
    {
        let shown: Vec<&str> = portfolio.iter().take(SHOWN_TICKERS).map(String::as_str).collect();
        let more = if portfolio.len() > SHOWN_TICKERS { "..." } else { "" };
        let _ = writeln!(out, "  Portfolio #{}: {}{more}", i + 1, shown.join(", "));
    }

    out
}

pub fn render_rolling(rows: &[RollingWindow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<12} {:>8} {:>8} {:>10}",
        "start", "end", "EW mean", "CW mean", "EW win %"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<12} {:<12} {:>8.3} {:>8.3} {:>10.1}",
            row.start_date.to_string(),
            row.end_date.to_string(),
            row.ew_mean,
            row.cw_mean,
            row.ew_win_rate
        );
    }
    out
}

/// Serialize any report to pretty JSON at `path`.
pub fn write_json<T: serde::Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value).context("report serialization failed")?;
    std::fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(())
}

fn significance(significant: bool) -> &'static str {
    if significant {
        "(significant at 5%)"
    } else {
        "(not significant)"
    }
}
