use chrono::NaiveDate;

/// Date × ticker matrices of monthly total returns and market caps.
///
/// Rows are months (ascending), columns are tickers (lexicographic).
/// Cells with no observation hold 0.0 in both matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnPanel {
    pub dates: Vec<NaiveDate>,
    pub tickers: Vec<String>,
    pub returns: Vec<Vec<f64>>,
    pub caps: Vec<Vec<f64>>,
}

impl ReturnPanel {
    pub fn new(
        dates: Vec<NaiveDate>,
        tickers: Vec<String>,
        returns: Vec<Vec<f64>>,
        caps: Vec<Vec<f64>>,
    ) -> Self {
        debug_assert_eq!(dates.len(), returns.len());
        debug_assert_eq!(dates.len(), caps.len());
        Self {
            dates,
            tickers,
            returns,
            caps,
        }
    }

    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }

    pub fn n_tickers(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.tickers.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Rows whose date falls in `[start, end]`.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> ReturnPanel {
        let from = self.dates.partition_point(|d| *d < start);
        let to = self.dates.partition_point(|d| *d <= end).max(from);
        self.window(from, to)
    }

    /// Rows `[start_idx, end_idx)`, clamped to the panel.
    pub fn window(&self, start_idx: usize, end_idx: usize) -> ReturnPanel {
        let end = end_idx.min(self.n_dates());
        let start = start_idx.min(end);
        ReturnPanel {
            dates: self.dates[start..end].to_vec(),
            tickers: self.tickers.clone(),
            returns: self.returns[start..end].to_vec(),
            caps: self.caps[start..end].to_vec(),
        }
    }

    /// Market caps shifted down by one month; the first row is all zeros.
    ///
    /// Cap weights for month t must only use information known at t-1.
    pub fn lagged_caps(&self) -> Vec<Vec<f64>> {
        let mut lagged = Vec::with_capacity(self.caps.len());
        if self.caps.is_empty() {
            return lagged;
        }
        lagged.push(vec![0.0; self.n_tickers()]);
        lagged.extend(self.caps[..self.caps.len() - 1].iter().cloned());
        lagged
    }
}
