//! Dartboard — can a blindfolded monkey beat the S&P 500?
//!
//! Monte Carlo test of Malkiel's random-walk claim: draw thousands of random
//! portfolios from the CRSP universe, score each by Sharpe ratio (equal and
//! cap weighted), and compare the distributions against SPY and IWM.

pub mod analytics;
pub mod config;
pub mod data;
pub mod error;
pub mod feeds;
pub mod models;
pub mod report;
pub mod simulation;
pub mod telemetry;
