//! CRSP monthly stock file ingestion.
//!
//! Expects one row per (month, ticker) with at least the columns
//! `DATE` (YYYYMMDD), `TICKER`, `total_ret` (return including delisting
//! return) and `mkt_cap` (in $ thousands). Everything else is ignored.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::panel::ReturnPanel;

const DATE_COL: &str = "DATE";
const TICKER_COL: &str = "TICKER";
const RETURN_COL: &str = "total_ret";
const CAP_COL: &str = "mkt_cap";

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("Invalid DATE '{value}' on line {line}")]
    InvalidDate { line: u64, value: String },

    #[error("No rows left after liquidity filter (mkt_cap > {min_market_cap})")]
    EmptyPanel { min_market_cap: f64 },
}

/// Running mean of duplicate (date, ticker) observations.
#[derive(Debug, Default, Clone, Copy)]
struct Cell {
    ret_sum: f64,
    cap_sum: f64,
    count: u32,
}

impl Cell {
    fn add(&mut self, ret: f64, cap: f64) {
        self.ret_sum += ret;
        self.cap_sum += cap;
        self.count += 1;
    }

    fn ret(&self) -> f64 {
        self.ret_sum / self.count as f64
    }

    fn cap(&self) -> f64 {
        self.cap_sum / self.count as f64
    }
}

/// Load a CRSP CSV from disk and pivot it into a [`ReturnPanel`].
pub fn load_panel<P: AsRef<Path>>(path: P, min_market_cap: f64) -> Result<ReturnPanel, DataError> {
    let path = path.as_ref();
    info!("Loading data from {}", path.display());

    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_panel(file, min_market_cap)
}

/// Parse CRSP rows from any reader, filter on liquidity and pivot.
pub fn read_panel<R: Read>(reader: R, min_market_cap: f64) -> Result<ReturnPanel, DataError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| DataError::MissingColumn {
                column: name.to_string(),
            })
    };
    let date_idx = column(DATE_COL)?;
    let ticker_idx = column(TICKER_COL)?;
    let ret_idx = column(RETURN_COL)?;
    let cap_idx = column(CAP_COL)?;

    let mut cells: BTreeMap<NaiveDate, BTreeMap<String, Cell>> = BTreeMap::new();
    let mut tickers: BTreeSet<String> = BTreeSet::new();
    let mut rows = 0usize;
    let mut kept = 0usize;

    for record in reader.records() {
        let record = record?;
        rows += 1;

        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| DataError::InvalidDate {
            line: record.position().map(|p| p.line()).unwrap_or(0),
            value: raw_date.to_string(),
        })?;

        let ticker = record.get(ticker_idx).unwrap_or_default().trim();
        let ret = record.get(ret_idx).and_then(parse_number);
        let cap = record.get(cap_idx).and_then(parse_number);

        let (Some(ret), Some(cap)) = (ret, cap) else {
            continue;
        };
        if cap <= min_market_cap || ticker.is_empty() {
            continue;
        }

        kept += 1;
        tickers.insert(ticker.to_string());
        cells
            .entry(date)
            .or_default()
            .entry(ticker.to_string())
            .or_default()
            .add(ret, cap);
    }

    debug!("CRSP rows read={rows} kept={kept}");

    if cells.is_empty() {
        return Err(DataError::EmptyPanel { min_market_cap });
    }

    let tickers: Vec<String> = tickers.into_iter().collect();
    let mut dates = Vec::with_capacity(cells.len());
    let mut returns = Vec::with_capacity(cells.len());
    let mut caps = Vec::with_capacity(cells.len());

    for (date, row) in &cells {
        dates.push(*date);
        let mut ret_row = vec![0.0; tickers.len()];
        let mut cap_row = vec![0.0; tickers.len()];
        for (col, ticker) in tickers.iter().enumerate() {
            if let Some(cell) = row.get(ticker) {
                ret_row[col] = cell.ret();
                cap_row[col] = cell.cap();
            }
        }
        returns.push(ret_row);
        caps.push(cap_row);
    }

    let panel = ReturnPanel::new(dates, tickers, returns, caps);
    info!(
        "Data ready. {} tickers over {} months.",
        panel.n_tickers(),
        panel.n_dates()
    );
    Ok(panel)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d").ok()
}

/// Lenient numeric coercion: CRSP letter codes ("B", "C") and blanks become missing.
fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
DATE,TICKER,COMNAM,RET,DLRET,total_ret,mkt_cap
20200131,AAA,Alpha,0.01,,0.01,50000
20200131,BBB,Beta,0.02,,0.02,20000
20200131,TINY,Tiny Co,0.50,,0.50,500
20200229,AAA,Alpha,C,,C,51000
20200229,BBB,Beta,-0.03,,-0.03,19000
20200229,BBB,Beta B,-0.01,,-0.01,21000
20200331,CCC,Gamma,0.04,-0.30,-0.27,15000
";

    #[test]
    fn test_pivot_and_filter() {
        let panel = read_panel(SAMPLE.as_bytes(), 10_000.0).unwrap();

        assert_eq!(panel.tickers, vec!["AAA", "BBB", "CCC"]);
        assert_eq!(panel.n_dates(), 3);
        assert_eq!(panel.first_date(), NaiveDate::from_ymd_opt(2020, 1, 31));

        // TINY fails the liquidity filter entirely
        assert!(!panel.tickers.contains(&"TINY".to_string()));

        // AAA's February return is a letter code: the cell is filled with 0
        assert_eq!(panel.returns[1][0], 0.0);
        assert_eq!(panel.caps[1][0], 0.0);

        // Duplicate BBB rows in February are averaged
        assert!((panel.returns[1][1] - (-0.02)).abs() < 1e-12);
        assert!((panel.caps[1][1] - 20_000.0).abs() < 1e-9);

        // CCC only exists in March and carries the delisting-adjusted return
        assert_eq!(panel.returns[0][2], 0.0);
        assert!((panel.returns[2][2] - (-0.27)).abs() < 1e-12);
    }

    #[test]
    fn test_filter_is_strict() {
        let csv = "DATE,TICKER,total_ret,mkt_cap\n20200131,AAA,0.01,10000\n20200131,BBB,0.01,10001\n";
        let panel = read_panel(csv.as_bytes(), 10_000.0).unwrap();
        assert_eq!(panel.tickers, vec!["BBB"]);
    }

    #[test]
    fn test_empty_ticker_rows_dropped() {
        let csv = "DATE,TICKER,total_ret,mkt_cap\n20200131,AAA,0.01,50000\n20200131,,0.02,60000\n20200131,  ,0.03,70000\n";
        let panel = read_panel(csv.as_bytes(), 10_000.0).unwrap();
        assert_eq!(panel.tickers, vec!["AAA"]);
        assert!((panel.returns[0][0] - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_only_empty_tickers_is_error() {
        let csv = "DATE,TICKER,total_ret,mkt_cap\n20200131,,0.02,60000\n";
        let err = read_panel(csv.as_bytes(), 10_000.0).unwrap_err();
        assert!(matches!(err, DataError::EmptyPanel { .. }));
    }

    #[test]
    fn test_missing_column() {
        let csv = "DATE,TICKER,RET\n20200131,AAA,0.01\n";
        let err = read_panel(csv.as_bytes(), 0.0).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column } if column == "total_ret"));
    }

    #[test]
    fn test_invalid_date() {
        let csv = "DATE,TICKER,total_ret,mkt_cap\n2020-01-31,AAA,0.01,50000\n";
        let err = read_panel(csv.as_bytes(), 0.0).unwrap_err();
        assert!(matches!(err, DataError::InvalidDate { line: 2, .. }), "got {err}");
    }

    #[test]
    fn test_everything_filtered_is_error() {
        let csv = "DATE,TICKER,total_ret,mkt_cap\n20200131,AAA,0.01,5\n";
        let err = read_panel(csv.as_bytes(), 10_000.0).unwrap_err();
        assert!(matches!(err, DataError::EmptyPanel { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(SAMPLE.as_bytes()).expect("write sample");
        let panel = load_panel(file.path(), 10_000.0).unwrap();
        assert_eq!(panel.n_tickers(), 3);
    }

    #[test]
    fn test_missing_file() {
        let err = load_panel("/definitely/not/here.csv", 0.0).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
