//! Progress Sink (A4): a pluggable trait for human-readable run progress, invoked by the
//! planner, executor, and scheduler at well-defined points. Mirrors this codebase's own
//! `kdam`-backed progress-bar helpers, generalized behind a trait so a future structured sink
//! (e.g. JSON lines) can share the same call sites.

use crate::types::BatchRange;
use kdam::{Bar, BarExt};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Figures from the Batch Planner (§4.5), surfaced once per run right after planning.
pub struct PlanSummary {
    pub num_terms: usize,
    pub num_batches: usize,
    pub chunk_mb: u64,
    pub usable_ac_mb: u64,
    pub max_words_per_ac: usize,
    pub num_threads: usize,
}

/// One batch's build + scan timings, reported when it finishes (§4.6 Expansion).
pub struct BatchReport {
    pub range: BatchRange,
    pub build_elapsed: Duration,
    pub scan_elapsed: Duration,
    pub approx_bytes: usize,
}

/// A periodic in-batch tick (§6.6: "at ≥30s intervals").
pub struct ProgressTick {
    pub range: BatchRange,
    pub lines_done: u64,
    pub total_lines: u64,
    pub elapsed: Duration,
}

impl ProgressTick {
    pub fn lines_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            0.0
        } else {
            self.lines_done as f64 / secs
        }
    }
}

/// Final tally, reported once all batches complete (or the run was cancelled).
pub struct RunSummary {
    pub terms_with_hits: usize,
    pub elapsed: Duration,
    pub cancelled: bool,
}

/// Invoked by C5/C6/C8 at plan-computed, batch-started/finished, periodic-tick, and
/// run-finished points. `Send + Sync` since batches run on independent worker threads.
pub trait ProgressSink: Send + Sync {
    fn plan_ready(&self, summary: &PlanSummary);
    fn batch_started(&self, range: BatchRange);
    fn tick(&self, tick: &ProgressTick);
    fn batch_finished(&self, report: &BatchReport);
    fn run_finished(&self, summary: &RunSummary);
}

/// Used by tests and any caller that wants the engine to run silently.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn plan_ready(&self, _summary: &PlanSummary) {}
    fn batch_started(&self, _range: BatchRange) {}
    fn tick(&self, _tick: &ProgressTick) {}
    fn batch_finished(&self, _report: &BatchReport) {}
    fn run_finished(&self, _summary: &RunSummary) {}
}

/// Default sink: a `kdam` bar tracking total lines processed across the run, with the
/// one-off/plan/batch-boundary events going through `log::info!` so they're visible even when
/// `kdam` falls back to non-interactive output (it detects TTY-ness itself; we don't duplicate
/// that detection here).
///
/// Every batch restreams the whole corpus (§4.6), so the bar's total is `total_lines *
/// num_batches`, not a single pass — otherwise the bar fills on the first batch and every batch
/// after it has nothing left to report. Each batch's progress is tracked independently in
/// `batch_progress` (keyed by `BatchRange`, so concurrent workers ticking on different batches
/// never clobber each other's high-water mark) and the bar only ever advances by the
/// newly-observed delta for that specific batch.
pub struct KdamProgressSink {
    bar: Mutex<Bar>,
    total_lines_per_pass: u64,
    batch_progress: Mutex<HashMap<BatchRange, u64>>,
}

impl KdamProgressSink {
    pub fn new(total_lines_per_pass: u64, num_batches: usize) -> Self {
        let total = total_lines_per_pass.saturating_mul(num_batches.max(1) as u64);
        let bar = kdam::tqdm!(total = total as usize, desc = "matching", unit = " lines");
        KdamProgressSink {
            bar: Mutex::new(bar),
            total_lines_per_pass,
            batch_progress: Mutex::new(HashMap::new()),
        }
    }

    /// Advance the bar by `lines_done` minus whatever was last reported for `range`, then
    /// record `lines_done` as the new high-water mark for that batch.
    fn advance(&self, range: BatchRange, lines_done: u64) {
        let delta = {
            let mut seen = self
                .batch_progress
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let prior = seen.insert(range, lines_done).unwrap_or(0);
            lines_done.saturating_sub(prior)
        };
        if delta > 0 {
            if let Ok(mut bar) = self.bar.try_lock() {
                let _ = bar.update(delta as usize);
            }
        }
    }
}

impl ProgressSink for KdamProgressSink {
    fn plan_ready(&self, summary: &PlanSummary) {
        log::info!(
            "plan: {} terms across {} batches, {} threads, chunk={} MB, usable_ac={} MB (~{} terms/batch)",
            summary.num_terms,
            summary.num_batches,
            summary.num_threads,
            summary.chunk_mb,
            summary.usable_ac_mb,
            summary.max_words_per_ac
        );
    }

    fn batch_started(&self, range: BatchRange) {
        log::debug!("batch [{}, {}) started", range.start, range.end);
    }

    fn tick(&self, tick: &ProgressTick) {
        self.advance(tick.range, tick.lines_done);
        log::info!(
            "batch [{}, {}): {:.0} lines/sec, {}/{} lines",
            tick.range.start,
            tick.range.end,
            tick.lines_per_sec(),
            tick.lines_done,
            tick.total_lines
        );
    }

    fn batch_finished(&self, report: &BatchReport) {
        // A batch that finishes faster than one tick interval (§6.6: ≥30s) never called
        // `advance` via `tick`; crediting the bar with the full per-pass line count here keeps
        // the bar's total in sync with `num_batches * total_lines_per_pass` regardless of how
        // many ticks a given batch produced.
        self.advance(report.range, self.total_lines_per_pass);
        log::info!(
            "batch [{}, {}) done: build={:.2?} scan={:.2?} automaton~{} KB",
            report.range.start,
            report.range.end,
            report.build_elapsed,
            report.scan_elapsed,
            report.approx_bytes / 1024
        );
    }

    fn run_finished(&self, summary: &RunSummary) {
        if let Ok(mut bar) = self.bar.try_lock() {
            let _ = bar.refresh();
        }
        if summary.cancelled {
            log::warn!(
                "run cancelled after {:.2?}; {} terms with hits written so far",
                summary.elapsed,
                summary.terms_with_hits
            );
        } else {
            log::info!(
                "run finished in {:.2?}: {} terms with hits",
                summary.elapsed,
                summary.terms_with_hits
            );
        }
    }
}
