//! Rolling-window dartboard analysis
//!
//! Re-runs the equal- vs cap-weight comparison over 5-year windows stepped
//! yearly across the whole panel, to show how the dartboard's edge varies
//! through time.
//!
//! Usage:  cargo run --bin rolling

use dartboard::config::Config;
use dartboard::data::load_panel;
use dartboard::feeds::yahoo::YahooClient;
use dartboard::report::summary;
use dartboard::simulation::{run_rolling_analysis, RollingParams};
use dartboard::telemetry::{logging, timing::StageTimings};

use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_or_default();
    logging::init(&config.telemetry);
    config.validate()?;

    let timings = StageTimings::new();
    let panel = {
        let _t = timings.start("load");
        load_panel(&config.data.data_file, config.data.min_market_cap)?
    };

    let rf_rate = match config.benchmark.forced_rf_rate {
        Some(rf) => rf,
        None if config.benchmark.offline => config.benchmark.default_rf_rate,
        None => {
            let (start, end) = panel
                .first_date()
                .zip(panel.last_date())
                .context("panel has no dates")?;
            YahooClient::new(&config.benchmark)?
                .risk_free_rate(start, end)
                .await
        }
    };

    let params = RollingParams {
        window_years: config.rolling.window_years,
        n_sims: config.rolling.n_sims,
        n_stocks: config.simulation.n_stocks,
        rf_rate,
        seed: config.simulation.seed,
    };
    info!(
        "Rolling analysis: {}y windows, {} sims x {} stocks, rf={:.2}%",
        params.window_years,
        params.n_sims,
        params.n_stocks,
        rf_rate * 100.0
    );

    let rows = {
        let _t = timings.start("rolling");
        run_rolling_analysis(&panel, &params)?
    };

    if rows.is_empty() {
        info!(
            "Panel spans {} months; nothing to roll with a {}-year window",
            panel.n_dates(),
            params.window_years
        );
    }
    println!("{}", summary::render_rolling(&rows));

    if let Some(path) = &config.report.output_path {
        summary::write_json(&rows, path)?;
    }

    timings.log_summary();
    Ok(())
}
