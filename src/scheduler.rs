//! Scheduler (C8, §4.8): a worker pool pulling whole batches from a shared atomic cursor, or a
//! plain loop when `num_threads == 1`. No channels, no thread pool — batches are coarse and
//! independent, so a single `AtomicUsize` claim counter is the whole coordination primitive
//! (§9 "Concurrency primitive").

use crate::corpus::CorpusScanner;
use crate::engine::progress::ProgressSink;
use crate::executor::run_batch;
use crate::output::OutputWriter;
use crate::types::{BatchRange, Term};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Run every batch in `batches` to completion, using `num_threads` workers. A worker claims the
/// next unclaimed batch via fetch-add on a shared cursor; it checks `cancelled` between batches
/// (never mid-batch — an in-flight AC build/scan always finishes) and stops once the cursor runs
/// past the last batch or cancellation is observed. `std::thread::scope` lets every worker borrow
/// `terms`/`scanner` directly instead of requiring `'static` ownership or an `Arc` wrapper around
/// data that already outlives this call.
pub fn run_all(
    batches: &[BatchRange],
    terms: &[Term],
    scanner: &CorpusScanner,
    writer: &Arc<OutputWriter>,
    progress: &Arc<dyn ProgressSink>,
    num_threads: usize,
    cancelled: &Arc<AtomicBool>,
) -> Result<()> {
    if batches.is_empty() {
        return Ok(());
    }

    if num_threads <= 1 {
        return run_serial(batches, terms, scanner, writer, progress, cancelled);
    }

    let cursor = AtomicUsize::new(0);
    let num_workers = num_threads.min(batches.len());
    let mut first_err = None;

    std::thread::scope(|s| {
        let mut handles = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let cursor = &cursor;
            handles.push(s.spawn(move || -> Result<()> {
                loop {
                    if cancelled.load(Ordering::Relaxed) {
                        return Ok(());
                    }
                    let i = cursor.fetch_add(1, Ordering::Relaxed);
                    if i >= batches.len() {
                        return Ok(());
                    }
                    run_batch(
                        batches[i],
                        terms,
                        scanner,
                        writer,
                        progress.as_ref(),
                        cancelled,
                    )?;
                }
            }));
        }

        for handle in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    log::error!("batch worker failed: {e:#}");
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
                Err(_) => {
                    log::error!("batch worker thread panicked");
                    if first_err.is_none() {
                        first_err = Some(anyhow::anyhow!("batch worker thread panicked"));
                    }
                }
            }
        }
    });

    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn run_serial(
    batches: &[BatchRange],
    terms: &[Term],
    scanner: &CorpusScanner,
    writer: &Arc<OutputWriter>,
    progress: &Arc<dyn ProgressSink>,
    cancelled: &Arc<AtomicBool>,
) -> Result<()> {
    for &range in batches {
        if cancelled.load(Ordering::Relaxed) {
            break;
        }
        run_batch(range, terms, scanner, writer, progress.as_ref(), cancelled)?;
    }
    Ok(())
}
