//! cgroup v2/v1 memory limit + usage reading (§4.1, §6.5). Linux-only; absence of any of these
//! files is not an error, only a `None` that the caller falls through on.

use std::path::Path;

const V2_MAX: &str = "/sys/fs/cgroup/memory.max";
const V2_CURRENT: &str = "/sys/fs/cgroup/memory.current";
const V1_LIMIT: &str = "/sys/fs/cgroup/memory/memory.limit_in_bytes";
const V1_USAGE: &str = "/sys/fs/cgroup/memory/memory.usage_in_bytes";

/// Container memory limit and current usage, in MB, or `None` if no cgroup info is readable.
/// Tries v2 first, then falls back to v1.
pub fn container_limit_and_usage_mb() -> Option<(u64, u64)> {
    read_pair_mb(V2_MAX, V2_CURRENT).or_else(|| read_pair_mb(V1_LIMIT, V1_USAGE))
}

fn read_pair_mb(limit_path: &str, usage_path: &str) -> Option<(u64, u64)> {
    let limit = read_limit_bytes(limit_path)?;
    let usage = read_number(usage_path)?;
    Some((limit / (1024 * 1024), usage / (1024 * 1024)))
}

/// `memory.max`/`memory.limit_in_bytes` may literally read `max` (v2) or a value close to
/// `i64::MAX` (v1, "no limit"); both mean "absent" here.
fn read_limit_bytes(path: &str) -> Option<u64> {
    let raw = read_trimmed(path)?;
    if raw == "max" {
        return None;
    }
    let value: u64 = raw.parse().ok()?;
    // v1's "unlimited" sentinel is 2^63 - 1 rounded to a page boundary; treat anything
    // absurdly large as unlimited rather than a real ceiling.
    if value > (u64::MAX / 2) {
        return None;
    }
    Some(value)
}

fn read_number(path: &str) -> Option<u64> {
    read_trimmed(path)?.parse().ok()
}

fn read_trimmed(path: &str) -> Option<String> {
    std::fs::read_to_string(Path::new(path))
        .ok()
        .map(|s| s.trim().to_string())
}
