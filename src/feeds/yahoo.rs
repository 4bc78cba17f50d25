use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::analytics::sharpe::sharpe_ratio;
use crate::config::BenchmarkConfig;
use crate::models::results::BenchmarkStats;

/// 13-week Treasury bill yield index, quoted in percent.
pub const TBILL_SYMBOL: &str = "^IRX";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// Daily price history from the Yahoo Finance chart API.
pub struct YahooClient {
    http: reqwest::Client,
    host: String,
    default_rf: f64,
}

impl YahooClient {
    /// Yahoo rejects requests without a User-Agent, so a builder failure is an error.
    pub fn new(config: &BenchmarkConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (dartboard)")
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .context("failed to build Yahoo HTTP client")?;
        Ok(Self {
            http,
            host: config.chart_host.trim_end_matches('/').to_string(),
            default_rf: config.default_rf_rate,
        })
    }

    /// Daily closes in `[start, end)`, adjusted where Yahoo provides it.
    pub async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>> {
        let url = chart_url(&self.host, symbol, start, end)?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("request for {symbol} failed"))?
            .error_for_status()
            .with_context(|| format!("bad status for {symbol}"))?;
        let body: ChartResponse = resp
            .json()
            .await
            .with_context(|| format!("malformed chart payload for {symbol}"))?;

        parse_chart(body)
    }

    /// Average 13-week T-bill yield over the period as a decimal rate.
    /// Falls back to the configured default on any failure.
    pub async fn risk_free_rate(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        match self.daily_closes(TBILL_SYMBOL, start, end).await {
            Ok(daily) => match mean_close(&daily) {
                Some(avg) => avg / 100.0,
                None => {
                    warn!(
                        "{TBILL_SYMBOL} download empty. Defaulting to {:.1}%.",
                        self.default_rf * 100.0
                    );
                    self.default_rf
                }
            },
            Err(e) => {
                warn!(
                    "{TBILL_SYMBOL} download failed ({e:#}). Defaulting to {:.1}%.",
                    self.default_rf * 100.0
                );
                self.default_rf
            }
        }
    }

    /// Sharpe ratio and arithmetic annualized return of a benchmark ETF.
    /// A failed download yields zeros.
    pub async fn benchmark_stats(
        &self,
        ticker: &str,
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
        rf_rate: f64,
    ) -> BenchmarkStats {
        info!("Fetching {ticker} from {start} to {end}...");
        let monthly = match self.daily_closes(ticker, start, end).await {
            Ok(daily) if !daily.is_empty() => monthly_returns(&daily),
            Ok(_) => {
                error!("No data found for {ticker}.");
                Vec::new()
            }
            Err(e) => {
                error!("Benchmark {ticker} failed: {e:#}");
                Vec::new()
            }
        };
        benchmark_from_monthly(ticker, name, &monthly, rf_rate)
    }
}

/// Summarise a benchmark from its monthly return series.
pub fn benchmark_from_monthly(ticker: &str, name: &str, monthly: &[f64], rf_rate: f64) -> BenchmarkStats {
    let annual_return = if monthly.is_empty() {
        0.0
    } else {
        monthly.iter().sum::<f64>() / monthly.len() as f64 * 12.0
    };
    BenchmarkStats {
        ticker: ticker.to_string(),
        name: name.to_string(),
        sharpe: sharpe_ratio(monthly, rf_rate),
        annual_return,
    }
}

/// Month-end closes → month-over-month returns (first month dropped).
pub fn monthly_returns(daily: &[DailyClose]) -> Vec<f64> {
    let mut month_ends: Vec<((i32, u32), f64)> = Vec::new();
    for d in daily {
        let key = (d.date.year(), d.date.month());
        match month_ends.last_mut() {
            Some((k, close)) if *k == key => *close = d.close,
            _ => month_ends.push((key, d.close)),
        }
    }

    month_ends
        .windows(2)
        .filter(|w| w[0].1 != 0.0)
        .map(|w| w[1].1 / w[0].1 - 1.0)
        .collect()
}

pub fn mean_close(daily: &[DailyClose]) -> Option<f64> {
    if daily.is_empty() {
        return None;
    }
    Some(daily.iter().map(|d| d.close).sum::<f64>() / daily.len() as f64)
}

fn chart_url(host: &str, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<url::Url> {
    let base = format!("{host}/v8/finance/chart/{}", symbol.replace('^', "%5E"));
    let period1 = unix_midnight(start).to_string();
    let period2 = unix_midnight(end).to_string();
    let url = url::Url::parse_with_params(
        &base,
        &[
            ("period1", period1.as_str()),
            ("period2", period2.as_str()),
            ("interval", "1d"),
            ("events", "div,splits"),
        ],
    )?;
    Ok(url)
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0)
}

fn parse_chart(body: ChartResponse) -> Result<Vec<DailyClose>> {
    if let Some(err) = body.chart.error {
        anyhow::bail!("Yahoo error {}: {}", err.code, err.description);
    }
    let result = body
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .context("chart payload has no result")?;

    let adjusted = result.indicators.adjclose.into_iter().next().map(|a| a.adjclose);
    let closes = match adjusted {
        Some(adj) if !adj.is_empty() => adj,
        _ => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    let daily = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let close = close.filter(|c| c.is_finite())?;
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some(DailyClose { date, close })
        })
        .collect();
    Ok(daily)
}

// --- Yahoo chart payload ---

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}
