//! Frame pacing monitor
//!
//! Tracks the interval between rendered frames over a rolling window and
//! classifies how far the loop is running behind its target rate.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::warn;

/// How the measured frame interval compares to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePace {
    /// Within 10% of the target interval
    Smooth,
    /// Up to 50% slower than target
    Degraded,
    /// More than 50% slower than target
    Struggling,
}

pub struct FrameMonitor {
    /// Rolling window of frame intervals
    intervals: VecDeque<Duration>,
    /// Maximum samples to keep
    max_samples: usize,
    target_interval: Duration,
    degraded_threshold: f32,
    struggling_threshold: f32,
    pace: FramePace,
}

impl FrameMonitor {
    pub fn new(target_fps: u32, max_samples: usize) -> Self {
        Self {
            intervals: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
            target_interval: Duration::from_secs_f32(1.0 / target_fps.max(1) as f32),
            degraded_threshold: 1.1,
            struggling_threshold: 1.5,
            pace: FramePace::Smooth,
        }
    }

    /// Record the time covered by one rendered frame
    pub fn record(&mut self, interval: Duration) {
        self.intervals.push_back(interval);
        while self.intervals.len() > self.max_samples {
            self.intervals.pop_front();
        }
        self.update_pace();
    }

    fn update_pace(&mut self) {
        if self.intervals.len() < 10 {
            // Not enough data yet
            return;
        }

        let ratio = self.average_interval().as_secs_f32() / self.target_interval.as_secs_f32();
        let pace = if ratio > self.struggling_threshold {
            FramePace::Struggling
        } else if ratio > self.degraded_threshold {
            FramePace::Degraded
        } else {
            FramePace::Smooth
        };

        if pace != self.pace {
            if pace != FramePace::Smooth {
                warn!(
                    "Frame pace {:?}: {:.1}ms average vs {:.1}ms target",
                    pace,
                    self.average_interval().as_secs_f32() * 1000.0,
                    self.target_interval.as_secs_f32() * 1000.0
                );
            }
            self.pace = pace;
        }
    }

    pub fn average_interval(&self) -> Duration {
        if self.intervals.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.intervals.iter().sum();
        total / self.intervals.len() as u32
    }

    /// Average frames per second over the window, 0 before any frame
    pub fn fps(&self) -> f32 {
        let avg = self.average_interval().as_secs_f32();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    pub fn pace(&self) -> FramePace {
        self.pace
    }

    pub fn sample_count(&self) -> usize {
        self.intervals.len()
    }
}
