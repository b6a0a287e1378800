//! Pipeline-wide statistics helpers.
//!
//! This module defines the `PipelineStats` structure used to track execution metrics
//! for recognition runs and the `StatsManager` helper that coordinates thread-safe
//! updates to these metrics.

use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Statistics for the recognition pipeline.
///
/// Counts pages and lines processed and accumulates time spent in the
/// inference engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    /// Pages recognized, including blank ones.
    pub pages_processed: usize,
    /// Pages that failed as a whole (unreadable image, shape mismatch).
    pub pages_failed: usize,
    /// Lines sent to the model.
    pub lines_processed: usize,
    /// Lines whose recognition failed.
    pub lines_failed: usize,
    /// Total time spent in inference, in milliseconds.
    pub total_inference_time_ms: f64,
}

impl PipelineStats {
    /// Creates a new PipelineStats instance with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean inference time per line in milliseconds.
    pub fn average_inference_time_ms(&self) -> f64 {
        if self.lines_processed == 0 {
            0.0
        } else {
            self.total_inference_time_ms / self.lines_processed as f64
        }
    }

    /// Returns the line success rate as a percentage (0.0 to 100.0).
    pub fn line_success_rate(&self) -> f64 {
        if self.lines_processed == 0 {
            0.0
        } else {
            (self.lines_processed - self.lines_failed) as f64 / self.lines_processed as f64 * 100.0
        }
    }

    /// Returns the average processing speed in lines per second.
    pub fn lines_per_second(&self) -> f64 {
        let average = self.average_inference_time_ms();
        if average == 0.0 { 0.0 } else { 1000.0 / average }
    }
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Statistics:")?;
        writeln!(
            f,
            "  Pages: {} ({} failed)",
            self.pages_processed, self.pages_failed
        )?;
        writeln!(
            f,
            "  Lines: {} ({:.1}% recognized)",
            self.lines_processed,
            self.line_success_rate()
        )?;
        writeln!(
            f,
            "  Average inference time: {:.2} ms",
            self.average_inference_time_ms()
        )?;
        writeln!(
            f,
            "  Processing speed: {:.2} lines/sec",
            self.lines_per_second()
        )?;
        Ok(())
    }
}

/// Thread-safe manager for updating pipeline statistics during recognition.
#[derive(Debug, Default)]
pub struct StatsManager {
    /// Shared statistics state guarded by a mutex.
    stats: Mutex<PipelineStats>,
}

impl StatsManager {
    /// Creates a new `StatsManager` instance with zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PipelineStats> {
        self.stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns a copy of the current statistics snapshot.
    pub fn get_stats(&self) -> PipelineStats {
        self.lock().clone()
    }

    /// Records one recognized page.
    pub fn record_page(&self, lines: usize, failed_lines: usize, inference_time_ms: f64) {
        let mut stats = self.lock();
        stats.pages_processed += 1;
        stats.lines_processed += lines;
        stats.lines_failed += failed_lines;
        stats.total_inference_time_ms += inference_time_ms;
    }

    /// Records a page that could not be processed at all.
    pub fn record_failed_page(&self) {
        self.lock().pages_failed += 1;
    }

    /// Resets the tracked statistics to their default state.
    pub fn reset_stats(&self) {
        *self.lock() = PipelineStats::default();
    }
}
