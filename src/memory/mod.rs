//! Memory Probe (C1, §4.1): advisory host/container memory budget and current RSS.
//!
//! The planner treats these as coarse ceilings, not guarantees (§4.1: "Results are advisory").

mod cgroup;
mod rss;

use sysinfo::System;

pub use rss::process_rss_mb;

/// Host free+buffer memory (what `free -m`'s "available" column reports), in MB, reconciled
/// against a container memory ceiling when one is readable.
///
/// Returns `min(container_limit - container_usage, host_available)` when a container limit is
/// present, `host_available` otherwise, and the compiled-in fallback (§4.1: 1024 MB) if even the
/// host-level probe fails.
pub fn available_memory_mb() -> u64 {
    let host = host_available_mb();

    match cgroup::container_limit_and_usage_mb() {
        Some((limit_mb, usage_mb)) => {
            let container_available = limit_mb.saturating_sub(usage_mb);
            match host {
                Some(host_mb) => container_available.min(host_mb),
                None => container_available,
            }
        }
        None => host.unwrap_or(crate::config::FALLBACK_AVAILABLE_MEMORY_MB),
    }
}

fn host_available_mb() -> Option<u64> {
    let mut sys = System::new();
    sys.refresh_memory();
    let available_bytes = sys.available_memory();
    if available_bytes == 0 {
        // sysinfo reports 0 when it couldn't read anything meaningful (e.g. restricted
        // container without /proc visibility); treat that like "no host figure" rather than
        // handing the planner a zero budget.
        return None;
    }
    Some(available_bytes / (1024 * 1024))
}
