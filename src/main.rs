use dartboard::config::Config;
use dartboard::data::load_panel;
use dartboard::feeds::yahoo::YahooClient;
use dartboard::report::summary;
use dartboard::simulation::Experiment;
use dartboard::telemetry::{logging, timing::StageTimings};

use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_or_default();
    logging::init(&config.telemetry);

    info!("================================================");
    info!("  THE DARTBOARD EXPERIMENT v0.1.0");
    info!("  Can a blindfolded monkey beat the S&P 500?");
    info!("================================================");

    if let Err(e) = config.validate() {
        error!("Config validation failed: {e}");
        return Err(e);
    }

    let timings = StageTimings::new();

    let panel = {
        let _t = timings.start("load");
        load_panel(&config.data.data_file, config.data.min_market_cap)?
    };

    let client = if config.benchmark.offline {
        warn!("DARTBOARD_OFFLINE set: no risk-free rate or benchmark downloads");
        None
    } else {
        Some(YahooClient::new(&config.benchmark)?)
    };

    let report = {
        let _t = timings.start("experiment");
        Experiment::run(&config, &panel, client.as_ref()).await?
    };

    println!("{}", summary::render(&report));

    if let Some(path) = &config.report.output_path {
        summary::write_json(&report, path)?;
    }

    timings.log_summary();
    Ok(())
}
