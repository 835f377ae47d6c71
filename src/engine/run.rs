//! Top-level run orchestration: wires the Memory Probe, Dictionary Loader, Batch Planner,
//! Corpus Scanner, Scheduler, and Output Writer together for one CLI invocation. The direct
//! analogue of a `handle_index`/`handle_check`-style command handler: all the setup a command
//! needs, in one place, with the actual work delegated to its owning module.

use crate::config::TuningConfig;
use crate::corpus::CorpusScanner;
use crate::engine::cli::Cli;
use crate::engine::progress::{KdamProgressSink, PlanSummary, ProgressSink, RunSummary};
use crate::output::OutputWriter;
use crate::plan::{plan_batches, plan_chunk_size_mb};
use crate::scheduler;
use crate::{dict, memory};
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Run one full pass under a freshly installed Ctrl+C handler. This is the entry point `main`
/// uses; process-wide signal handlers can only be installed once, so tests that want to drive
/// the pipeline repeatedly in one process use [`run_with_cancel`] instead.
pub fn run(cli: &Cli) -> Result<()> {
    let cancelled = setup_ctrlc_handler()?;
    run_with_cancel(cli, cancelled)
}

/// Run one full pass: load the dictionary, plan batches against the memory budget, scan the
/// corpus boundaries once, then schedule every batch across `cli.resolve_thread_count()` workers.
/// Returns once the output file is flushed.
pub fn run_with_cancel(cli: &Cli, cancelled: Arc<AtomicBool>) -> Result<()> {
    let started = Instant::now();

    let tuning = TuningConfig::load(&cli.dict_path);
    let num_threads = cli.resolve_thread_count();

    let dictionary = dict::load_dictionary(&cli.dict_path)?;
    let file_size_mb = corpus_size_mb(&cli.text_path)?;
    let available_mem_mb = memory::available_memory_mb();

    log::info!(
        "dictionary: {} terms; corpus: {} MB; available memory: {} MB; threads: {}",
        dictionary.len(),
        file_size_mb,
        available_mem_mb,
        num_threads
    );

    let output_path = cli.output_path();
    let writer = OutputWriter::create(&output_path)?;

    if dictionary.is_empty() {
        log::info!("dictionary is empty; writing empty output and exiting");
        writer.flush()?;
        return Ok(());
    }

    let chunk_mb = plan_chunk_size_mb(dictionary.len(), &tuning, available_mem_mb, file_size_mb);
    let scanner = CorpusScanner::scan(&cli.text_path, chunk_mb * 1024 * 1024)?;

    let available_now_mb = memory::available_memory_mb();
    let plan = plan_batches(
        dictionary.len(),
        &tuning,
        available_now_mb,
        chunk_mb,
        num_threads,
    )?;

    let progress: Arc<dyn ProgressSink> = Arc::new(KdamProgressSink::new(
        scanner.total_lines(),
        plan.batches.len(),
    ));
    progress.plan_ready(&PlanSummary {
        num_terms: dictionary.len(),
        num_batches: plan.batches.len(),
        chunk_mb,
        usable_ac_mb: plan.usable_ac_mb,
        max_words_per_ac: plan.max_words_per_ac,
        num_threads,
    });

    scheduler::run_all(
        &plan.batches,
        &dictionary.terms,
        &scanner,
        &writer,
        &progress,
        num_threads,
        &cancelled,
    )?;

    writer.flush()?;

    let terms_with_hits = count_output_lines(&output_path)?;
    progress.run_finished(&RunSummary {
        terms_with_hits,
        elapsed: started.elapsed(),
        cancelled: cancelled.load(Ordering::Relaxed),
    });
    log::debug!("process RSS at exit: {} MB", memory::process_rss_mb().unwrap_or(0));

    Ok(())
}

fn corpus_size_mb(path: &std::path::Path) -> Result<u64> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("stat corpus {}", path.display()))?;
    Ok(metadata.len() / (1024 * 1024))
}

fn count_output_lines(path: &std::path::Path) -> Result<usize> {
    use std::io::BufRead;
    let file = std::fs::File::open(path).with_context(|| format!("reopening {}", path.display()))?;
    Ok(std::io::BufReader::new(file).lines().count())
}

/// Install a Ctrl+C handler flipping a shared flag; the scheduler checks it between batches
/// (never mid-batch) so a SIGINT lets the in-flight batch finish before the run stops (§4.8, §5).
fn setup_ctrlc_handler() -> Result<Arc<AtomicBool>> {
    let cancelled = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancelled);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })
    .context("installing Ctrl+C handler")?;
    Ok(cancelled)
}
