use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Stage timings of one detection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTiming {
    /// Time spent building batch statistics.
    pub stats_micros: u64,
    /// Time spent classifying every item.
    pub classify_micros: u64,
    /// Classification throughput.
    pub items_per_second: f64,
}

impl BatchTiming {
    pub fn record_stats(&mut self, elapsed: Duration) {
        self.stats_micros = elapsed.as_micros() as u64;
    }

    /// Record the classification stage and derive throughput.
    pub fn record_classify(&mut self, item_count: u64, elapsed: Duration) {
        self.classify_micros = elapsed.as_micros() as u64;
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            self.items_per_second = item_count as f64 / secs;
        }
    }

    /// Start a scoped timer for one stage.
    pub fn timer(&self) -> StageTimer {
        StageTimer {
            start: Instant::now(),
        }
    }
}

/// A scoped timer for one pipeline stage.
pub struct StageTimer {
    start: Instant,
}

impl StageTimer {
    pub fn finish_stats(self, timing: &mut BatchTiming) {
        timing.record_stats(self.start.elapsed());
    }

    pub fn finish_classify(self, timing: &mut BatchTiming, item_count: u64) {
        timing.record_classify(item_count, self.start.elapsed());
    }
}
