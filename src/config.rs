//! Tuning constants (A1): calibration figures behind §4.5's planner arithmetic, in one place,
//! overridable by an optional `wikifilter.toml` and by `WIKIFILTER_*` environment variables.
//!
//! Mirrors this codebase's habit of keeping magic numbers in a dedicated config module instead
//! of scattered through the modules that use them.

use serde::Deserialize;
use std::path::Path;

/// Reserve held back from the memory budget for process overhead not attributable to the AC
/// automaton or the corpus chunk buffer (§4.5 step 2).
pub const DEFAULT_RESERVE_MB: u64 = 300;

/// Calibrated average bytes of AC storage per dictionary term (§4.5). Reference figure: ~483
/// B/term measured over ~2.1M Chinese terms, rounded up to 500.
pub const DEFAULT_BYTES_PER_TERM: u64 = 500;

/// Minimum chunk size regardless of how tight the memory budget is (§4.5 step 3).
pub const DEFAULT_CHUNK_FLOOR_MB: u64 = 50;

/// Unconditional floor on the usable-AC budget recomputed at §4.5 step 4
/// (`usable_ac_mb = max(512, available_now - chunk_peak - reserve_mb)`), applied every run, not
/// only once the raw figure comes up empty. If even this floor fits zero terms per batch, §7's
/// `MemoryBudgetError` is fatal — there is no further retry at a smaller floor.
pub const DEFAULT_MIN_USABLE_AC_MB: u64 = 512;

/// Fraction of the chunk budget actually used for chunk sizing (§4.5 step 3).
pub const CHUNK_BUDGET_FRACTION: f64 = 0.8;

/// Fallback host memory figure (MB) when every memory probe source fails (§4.1).
pub const FALLBACK_AVAILABLE_MEMORY_MB: u64 = 1024;

/// Sanity ceiling on auto-detected or user-supplied thread count, guarding against container
/// CPU-count misreporting (§5, §6.1).
pub const MAX_THREADS: usize = 64;

/// Thread count used when auto-detection itself yields something degenerate (§6.1: "cap 64 → 2").
pub const FALLBACK_THREADS: usize = 2;

/// Minimum interval between periodic in-batch progress lines (§6.6: "at ≥30s intervals").
pub const PROGRESS_TICK_SECS: u64 = 30;

/// Calibration constants, deserializable from `wikifilter.toml`. `Default` matches the
/// compiled-in reference figures above exactly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    pub bytes_per_term: u64,
    pub reserve_mb: u64,
    pub chunk_floor_mb: u64,
    pub min_usable_ac_mb: u64,
    pub chunk_budget_fraction: f64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            bytes_per_term: DEFAULT_BYTES_PER_TERM,
            reserve_mb: DEFAULT_RESERVE_MB,
            chunk_floor_mb: DEFAULT_CHUNK_FLOOR_MB,
            min_usable_ac_mb: DEFAULT_MIN_USABLE_AC_MB,
            chunk_budget_fraction: CHUNK_BUDGET_FRACTION,
        }
    }
}

impl TuningConfig {
    /// Load defaults, then a `wikifilter.toml` beside `dict_path`'s parent directory if present,
    /// then environment overrides. Never fails: a missing or unparsable file/var is logged and
    /// skipped, matching §6.5's "each optional, each parsed with a warn!-logged fallback."
    pub fn load(dict_path: &Path) -> Self {
        let mut cfg = Self::default();

        if let Some(dir) = dict_path.parent() {
            let toml_path = dir.join("wikifilter.toml");
            if let Ok(text) = std::fs::read_to_string(&toml_path) {
                match toml::from_str::<TuningConfig>(&text) {
                    Ok(file_cfg) => cfg = file_cfg,
                    Err(e) => log::warn!("{}: {e}", toml_path.display()),
                }
            }
        }

        cfg.apply_env_overrides();
        cfg
    }

    fn apply_env_overrides(&mut self) {
        apply_u64_env("WIKIFILTER_BYTES_PER_TERM", &mut self.bytes_per_term);
        apply_u64_env("WIKIFILTER_RESERVE_MB", &mut self.reserve_mb);
        apply_u64_env("WIKIFILTER_CHUNK_FLOOR_MB", &mut self.chunk_floor_mb);
        apply_u64_env("WIKIFILTER_MIN_USABLE_AC_MB", &mut self.min_usable_ac_mb);
    }
}

fn apply_u64_env(var: &str, slot: &mut u64) {
    if let Ok(raw) = std::env::var(var) {
        match raw.parse::<u64>() {
            Ok(v) => *slot = v,
            Err(e) => log::warn!("{var}={raw:?}: {e}, keeping default"),
        }
    }
}
