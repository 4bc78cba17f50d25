pub mod experiment;
pub mod monte_carlo;
pub mod rolling;

pub use experiment::{Experiment, ExperimentReport};
pub use monte_carlo::{run_monte_carlo, MonteCarloConfig};
pub use rolling::{run_rolling_analysis, RollingParams};
