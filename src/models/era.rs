use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::panel::ReturnPanel;

/// Historical market regimes the experiment can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEra {
    FullHistory,
    DotcomBubble,
    FinancialCrisis,
    PostCovid,
}

impl MarketEra {
    pub fn label(&self) -> &'static str {
        match self {
            MarketEra::FullHistory => "Full History (2000-2024)",
            MarketEra::DotcomBubble => "Dotcom Bubble",
            MarketEra::FinancialCrisis => "2008 GFC",
            MarketEra::PostCovid => "Post-Covid",
        }
    }

    /// Inclusive date bounds of the era. Open-ended eras borrow the panel's own bounds.
    pub fn bounds(&self, panel: &ReturnPanel) -> Option<(NaiveDate, NaiveDate)> {
        let first = panel.first_date()?;
        let last = panel.last_date()?;
        let bounds = match self {
            MarketEra::FullHistory => (first, last),
            MarketEra::DotcomBubble => (ymd(2000, 1, 1), ymd(2002, 12, 31)),
            MarketEra::FinancialCrisis => (ymd(2007, 10, 1), ymd(2009, 3, 31)),
            MarketEra::PostCovid => (ymd(2020, 3, 1), last),
        };
        Some(bounds)
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

impl FromStr for MarketEra {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" | "full-history" | "all" => Ok(MarketEra::FullHistory),
            "dotcom" | "dotcom-bubble" => Ok(MarketEra::DotcomBubble),
            "gfc" | "2008" | "financial-crisis" => Ok(MarketEra::FinancialCrisis),
            "covid" | "post-covid" => Ok(MarketEra::PostCovid),
            other => Err(format!("unknown market era '{other}'")),
        }
    }
}

impl std::fmt::Display for MarketEra {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
