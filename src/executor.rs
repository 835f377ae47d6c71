//! Batch Executor (C6, §4.6): build one automaton, stream the corpus once, accumulate
//! per-term line counts, hand them to the output writer.

use crate::ac::Automaton;
use crate::config::PROGRESS_TICK_SECS;
use crate::corpus::CorpusScanner;
use crate::engine::progress::{BatchReport, ProgressSink, ProgressTick};
use crate::output::OutputWriter;
use crate::types::{BatchRange, Term};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Run one batch end to end: build its automaton, scan the corpus, count, and append to the
/// shared output writer. Counters are a plain `Vec<u32>`, not atomics — §4.6 Expansion: each
/// batch is executed by exactly one worker for its whole lifetime, so nothing else ever touches
/// this vector.
pub fn run_batch(
    range: BatchRange,
    terms: &[Term],
    scanner: &CorpusScanner,
    writer: &OutputWriter,
    progress: &dyn ProgressSink,
    cancelled: &Arc<AtomicBool>,
) -> Result<()> {
    let batch_terms = &terms[range.as_range()];
    progress.batch_started(range);

    let build_started = Instant::now();
    let automaton = Automaton::build(batch_terms, range.start);
    let build_elapsed = build_started.elapsed();

    let mut counts = vec![0u32; range.len()];
    let mut matches = Vec::new();
    let total_lines = scanner.total_lines();
    let tick_interval = Duration::from_secs(PROGRESS_TICK_SECS);

    let scan_started = Instant::now();
    let mut last_tick = scan_started;
    let mut lines_done: u64 = 0;
    scanner.stream(|line, _chunk_idx, _global_line_idx| {
        automaton.search_line(line, &mut matches);
        for &local_index in &matches {
            counts[local_index as usize] += 1;
        }
        lines_done += 1;

        let now = Instant::now();
        if now.duration_since(last_tick) >= tick_interval {
            progress.tick(&ProgressTick {
                range,
                lines_done,
                total_lines,
                elapsed: now.duration_since(scan_started),
            });
            last_tick = now;
        }

        !cancelled.load(Ordering::Relaxed)
    })?;
    let scan_elapsed = scan_started.elapsed();

    writer.append_batch(batch_terms, &counts);

    progress.batch_finished(&BatchReport {
        range,
        build_elapsed,
        scan_elapsed,
        approx_bytes: automaton.approx_bytes(),
    });

    // automaton and counts drop here, before the worker claims the next batch (§4.6 step 5).
    Ok(())
}
