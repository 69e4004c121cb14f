//! Progress reporting for long passes
//!
//! Emits a `tracing` event every `interval` steps and once more on completion.

use std::time::Instant;
use tracing::info;

pub struct ProgressReporter {
    stage: &'static str,
    total: usize,
    interval: usize,
    done: usize,
    started: Instant,
}

impl ProgressReporter {
    pub fn new(stage: &'static str, total: usize, interval: usize) -> Self {
        Self {
            stage,
            total,
            interval: interval.max(1),
            done: 0,
            started: Instant::now(),
        }
    }

    /// Record one finished step; returns true when an event was emitted
    pub fn tick(&mut self) -> bool {
        self.done += 1;
        if self.done != self.total && self.done % self.interval != 0 {
            return false;
        }

        let percent = if self.total == 0 {
            100.0
        } else {
            self.done as f64 * 100.0 / self.total as f64
        };
        info!(
            stage = self.stage,
            done = self.done,
            total = self.total,
            percent = (percent * 10.0).round() / 10.0,
            elapsed_secs = self.started.elapsed().as_secs(),
            "Progress"
        );
        true
    }

    pub fn done(&self) -> usize {
        self.done
    }
}
