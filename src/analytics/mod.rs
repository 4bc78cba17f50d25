pub mod sharpe;
pub mod stats;

pub use sharpe::sharpe_ratio;
pub use stats::{bootstrap_ci, compute_statistics, percentile, test_ew_vs_cw, test_vs_benchmark};
