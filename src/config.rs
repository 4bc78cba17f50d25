use serde::{Deserialize, Serialize};

use crate::models::era::MarketEra;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub simulation: SimulationConfig,
    pub benchmark: BenchmarkConfig,
    pub rolling: RollingConfig,
    pub report: ReportConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub data_file: String,
    pub min_market_cap: f64, // CRSP units ($ thousands), 10_000 = $10M
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub n_stocks: usize,
    pub n_sims: usize,
    pub seed: Option<u64>,
    pub era: MarketEra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub tickers: Vec<(String, String)>, // (symbol, display name)
    pub default_rf_rate: f64,
    pub forced_rf_rate: Option<f64>,
    pub offline: bool,
    pub chart_host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingConfig {
    pub window_years: usize,
    pub n_sims: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

pub const MIN_STOCKS: usize = 10;
pub const MAX_STOCKS: usize = 100;
pub const MIN_SIMS: usize = 100;
pub const MAX_SIMS: usize = 5000;
pub const MAX_WINDOW_YEARS: usize = 50;

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_file: "US_SPYdata_2000_2024.csv".into(),
            min_market_cap: 10_000.0,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_stocks: 30,
            n_sims: 500,
            seed: None,
            era: MarketEra::FullHistory,
        }
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            tickers: vec![
                ("SPY".into(), "S&P 500".into()),
                ("IWM".into(), "Russell 2000".into()),
            ],
            default_rf_rate: 0.03,
            forced_rf_rate: None,
            offline: false,
            chart_host: "https://query1.finance.yahoo.com".into(),
        }
    }
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            window_years: 5,
            n_sims: 100,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            simulation: SimulationConfig::default(),
            benchmark: BenchmarkConfig::default(),
            rolling: RollingConfig::default(),
            report: ReportConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables (.env file) with defaults.
    ///
    /// Optional env vars:
    ///   DARTBOARD_DATA_FILE — CRSP monthly CSV (default: US_SPYdata_2000_2024.csv)
    ///   DARTBOARD_MIN_MKT_CAP — liquidity filter in CRSP units (default: 10000)
    ///   DARTBOARD_N_STOCKS, DARTBOARD_N_SIMS — darts per portfolio / sample size
    ///   DARTBOARD_SEED — fixed RNG seed for reproducible runs
    ///   DARTBOARD_ERA — full | dotcom | gfc | covid
    ///   DARTBOARD_RF_RATE — force the risk-free rate (skips ^IRX download)
    ///   DARTBOARD_OFFLINE — "true" to skip all network fetches
    ///   DARTBOARD_WINDOW_YEARS, DARTBOARD_ROLLING_SIMS — rolling analysis
    ///   DARTBOARD_OUTPUT — write the JSON report here
    ///   RUST_LOG — log level (default: info)
    pub fn load_or_default() -> Self {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset or unparseable values keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str| lookup(key).map(|v| v.trim().to_string());
        let mut config = Self::default();

        if let Some(path) = lookup("DARTBOARD_DATA_FILE").filter(|p| !p.is_empty()) {
            config.data.data_file = path;
        }
        if let Some(cap) = parse_value(parse("DARTBOARD_MIN_MKT_CAP")) {
            config.data.min_market_cap = cap;
        }

        if let Some(n) = parse_value(parse("DARTBOARD_N_STOCKS")) {
            config.simulation.n_stocks = n;
        }
        if let Some(n) = parse_value(parse("DARTBOARD_N_SIMS")) {
            config.simulation.n_sims = n;
        }
        config.simulation.seed = parse_value(parse("DARTBOARD_SEED"));

        if let Some(era) = lookup("DARTBOARD_ERA") {
            match era.parse() {
                Ok(era) => config.simulation.era = era,
                Err(e) => tracing::warn!("{e}; using full history"),
            }
        }

        config.benchmark.forced_rf_rate = parse_value(parse("DARTBOARD_RF_RATE"));
        config.benchmark.offline = parse_flag(parse("DARTBOARD_OFFLINE"));

        if let Some(years) = parse_value(parse("DARTBOARD_WINDOW_YEARS")) {
            config.rolling.window_years = years;
        }
        if let Some(n) = parse_value(parse("DARTBOARD_ROLLING_SIMS")) {
            config.rolling.n_sims = n;
        }

        if let Some(path) = lookup("DARTBOARD_OUTPUT").filter(|p| !p.is_empty()) {
            config.report.output_path = Some(path);
        }

        if let Some(level) = lookup("RUST_LOG") {
            config.telemetry.log_level = level;
        }

        config
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let sim = &self.simulation;
        anyhow::ensure!(
            (MIN_STOCKS..=MAX_STOCKS).contains(&sim.n_stocks),
            "n_stocks must be between {MIN_STOCKS} and {MAX_STOCKS}, got {}",
            sim.n_stocks
        );
        anyhow::ensure!(
            (MIN_SIMS..=MAX_SIMS).contains(&sim.n_sims),
            "n_sims must be between {MIN_SIMS} and {MAX_SIMS}, got {}",
            sim.n_sims
        );
        anyhow::ensure!(
            self.data.min_market_cap >= 0.0,
            "min_market_cap must be non-negative"
        );
        anyhow::ensure!(
            (1..=MAX_WINDOW_YEARS).contains(&self.rolling.window_years),
            "rolling window must be between 1 and {MAX_WINDOW_YEARS} years, got {}",
            self.rolling.window_years
        );
        anyhow::ensure!(self.rolling.n_sims >= 1, "rolling n_sims must be positive");
        if let Some(rf) = self.benchmark.forced_rf_rate {
            anyhow::ensure!(rf.is_finite(), "DARTBOARD_RF_RATE must be finite");
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|s| s.parse().ok())
}

fn parse_flag(raw: Option<String>) -> bool {
    raw.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_too_few_stocks() {
        let mut config = Config::default();
        config.simulation.n_stocks = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_too_many_sims() {
        let mut config = Config::default();
        config.simulation.n_sims = MAX_SIMS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_nan_rf() {
        let mut config = Config::default();
        config.benchmark.forced_rf_rate = Some(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_benchmarks() {
        let config = BenchmarkConfig::default();
        let symbols: Vec<&str> = config.tickers.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(symbols, vec!["SPY", "IWM"]);
        assert!((config.default_rf_rate - 0.03).abs() < 1e-12);
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_lookup_overrides_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DARTBOARD_N_STOCKS", " 50 "),
            ("DARTBOARD_SEED", "7"),
            ("DARTBOARD_ERA", "gfc"),
            ("DARTBOARD_RF_RATE", "0.045"),
            ("DARTBOARD_OUTPUT", "out.json"),
        ]));
        assert_eq!(config.simulation.n_stocks, 50);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.era, MarketEra::FinancialCrisis);
        assert_eq!(config.benchmark.forced_rf_rate, Some(0.045));
        assert_eq!(config.report.output_path.as_deref(), Some("out.json"));
    }

    #[test]
    fn test_unparseable_values_keep_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DARTBOARD_N_STOCKS", "thirty"),
            ("DARTBOARD_N_SIMS", ""),
            ("DARTBOARD_MIN_MKT_CAP", "lots"),
            ("DARTBOARD_SEED", "-1"),
            ("DARTBOARD_ERA", "roaring-twenties"),
            ("DARTBOARD_RF_RATE", "n/a"),
            ("DARTBOARD_WINDOW_YEARS", "5y"),
        ]));
        let defaults = Config::default();
        assert_eq!(config.simulation.n_stocks, defaults.simulation.n_stocks);
        assert_eq!(config.simulation.n_sims, defaults.simulation.n_sims);
        assert_eq!(config.data.min_market_cap, defaults.data.min_market_cap);
        assert_eq!(config.simulation.seed, None);
        assert_eq!(config.simulation.era, MarketEra::FullHistory);
        assert_eq!(config.benchmark.forced_rf_rate, None);
        assert_eq!(config.rolling.window_years, defaults.rolling.window_years);
    }

    #[test]
    fn test_offline_flag_parsing() {
        for (raw, expected) in [("true", true), ("1", true), ("TRUE", true), ("false", false), ("0", false), ("yes", false)] {
            let config = Config::from_lookup(lookup_from(&[("DARTBOARD_OFFLINE", raw)]));
            assert_eq!(config.benchmark.offline, expected, "DARTBOARD_OFFLINE={raw}");
        }
        assert!(!Config::from_lookup(|_| None).benchmark.offline);
    }

    #[test]
    fn test_rejects_huge_window() {
        let mut config = Config::default();
        config.rolling.window_years = MAX_WINDOW_YEARS + 1;
        assert!(config.validate().is_err());
        config.rolling.window_years = 0;
        assert!(config.validate().is_err());
    }
}
