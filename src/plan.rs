//! Batch Planner (C5, §4.5): turns a memory budget, dictionary size, and thread count into a
//! corpus chunk size and a list of [`BatchRange`]s.
//!
//! Split into two calls because the chunk size has to be known *before* the corpus scanner's
//! pass 1 runs, while the batch list needs the scanner's actual chunk footprint to refine the
//! usable AC budget (§4.5 steps 3 vs. 4).

use crate::config::TuningConfig;
use crate::error::WikiFilterError;
use crate::types::BatchRange;
use anyhow::Result;

/// Step 1-3: predicted AC footprint, then the corpus chunk size pass 1 should use.
pub fn plan_chunk_size_mb(
    num_terms: usize,
    tuning: &TuningConfig,
    available_mem_mb: u64,
    file_size_mb: u64,
) -> u64 {
    let ac_mem_est_mb = ac_mem_est_mb(num_terms, tuning);
    let chunk_budget_mb = available_mem_mb
        .saturating_sub(ac_mem_est_mb)
        .saturating_sub(tuning.reserve_mb);

    let scaled = (chunk_budget_mb as f64 * tuning.chunk_budget_fraction) as u64;
    let mut chunk_mb = tuning.chunk_floor_mb.max(scaled);

    if file_size_mb <= chunk_budget_mb {
        // The whole corpus fits the budget: size the chunk one MB past the file so pass 1
        // produces exactly one chunk and the scanner takes the mmap fast path.
        chunk_mb = file_size_mb + 1;
    }
    chunk_mb
}

fn ac_mem_est_mb(num_terms: usize, tuning: &TuningConfig) -> u64 {
    (num_terms as u64 * tuning.bytes_per_term) / (1024 * 1024)
}

/// The outcome of batch planning: the dictionary slices to run, and the budget figures that
/// produced them (surfaced to the progress sink's plan summary).
#[derive(Debug)]
pub struct BatchPlan {
    pub batches: Vec<BatchRange>,
    pub usable_ac_mb: u64,
    pub max_words_per_ac: usize,
}

/// Step 4-6: given the chunk size actually used by the scanner (`chunk_peak_mb`) and a fresh
/// memory read (`available_now_mb`), compute the usable AC budget and partition the dictionary.
pub fn plan_batches(
    num_terms: usize,
    tuning: &TuningConfig,
    available_now_mb: u64,
    chunk_peak_mb: u64,
    num_threads: usize,
) -> Result<BatchPlan> {
    if num_terms == 0 {
        return Ok(BatchPlan {
            batches: Vec::new(),
            usable_ac_mb: tuning.min_usable_ac_mb,
            max_words_per_ac: 0,
        });
    }

    // §4.5 step 4: `usable_ac_mb = max(512, available_now - chunk_peak - reserve_mb)` is an
    // unconditional floor, not a fallback tried only once the raw budget comes up empty —
    // applying it conditionally would let a raw budget in `0 MB < raw < 512 MB` plan more,
    // smaller batches than the step prescribes.
    let raw_usable_ac_mb = available_now_mb
        .saturating_sub(chunk_peak_mb)
        .saturating_sub(tuning.reserve_mb);
    let usable_ac_mb = raw_usable_ac_mb.max(tuning.min_usable_ac_mb);
    let max_words_per_ac = words_per_ac(usable_ac_mb, tuning.bytes_per_term);

    if max_words_per_ac == 0 {
        log::warn!(
            "usable AC budget ({usable_ac_mb} MB, already at the {} MB floor) fits zero terms",
            tuning.min_usable_ac_mb
        );
        return Err(WikiFilterError::MemoryBudget {
            requested_terms: num_terms,
            usable_ac_mb,
        }
        .into());
    }

    let num_batches = if num_threads <= 1 {
        if num_terms <= max_words_per_ac {
            1
        } else {
            div_ceil(num_terms, max_words_per_ac)
        }
    } else {
        div_ceil(num_terms, max_words_per_ac).max(num_threads)
    };
    // Oversubscribing batches vs. threads aids tail load balance (§4.5 step 6), but never
    // splits finer than one term per batch.
    let num_batches = num_batches.min(num_terms);

    Ok(BatchPlan {
        batches: equalize(num_terms, num_batches),
        usable_ac_mb,
        max_words_per_ac,
    })
}

fn words_per_ac(usable_ac_mb: u64, bytes_per_term: u64) -> usize {
    ((usable_ac_mb * 1024 * 1024) / bytes_per_term.max(1)) as usize
}

fn div_ceil(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// Split `num_terms` into `num_batches` contiguous, size-equalized ranges (earlier batches get
/// the one-term remainder so no batch differs from another by more than one term).
fn equalize(num_terms: usize, num_batches: usize) -> Vec<BatchRange> {
    let num_batches = num_batches.max(1);
    let base = num_terms / num_batches;
    let remainder = num_terms % num_batches;

    let mut batches = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + usize::from(i < remainder);
        let end = start + size;
        batches.push(BatchRange::new(start, end));
        start = end;
    }
    batches
}
