use std::time::{Duration, Instant};
use tracing::info;

/// Wall-clock timings of named pipeline stages, in completion order.
#[derive(Debug, Default)]
pub struct StageTimings {
    stages: std::sync::Mutex<Vec<(String, Duration)>>,
}

impl StageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, stage: &str, duration: Duration) {
        if let Ok(mut stages) = self.stages.lock() {
            stages.push((stage.to_string(), duration));
        }
    }

    /// Start a timer that records on drop.
    pub fn start(&self, stage: &str) -> Timer<'_> {
        Timer {
            stage: stage.to_string(),
            start: Instant::now(),
            timings: self,
        }
    }

    pub fn log_summary(&self) {
        let Ok(stages) = self.stages.lock() else {
            return;
        };
        for (stage, duration) in stages.iter() {
            info!("Timing [{stage}]: {:.1}ms", duration.as_secs_f64() * 1000.0);
        }
    }
}

pub struct Timer<'a> {
    stage: String,
    start: Instant,
    timings: &'a StageTimings,
}

impl<'a> Drop for Timer<'a> {
    fn drop(&mut self) {
        self.timings.record(&self.stage, self.start.elapsed());
    }
}
