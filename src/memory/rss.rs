//! Process RSS reading (§4.1). Linux reads `/proc/self/status`; other Unixes fall back to
//! `getrusage`. Advisory/logging-only: callers treat a missing value as `0`, never as a budget.

/// Current process resident set size, in MB, or `None` if unavailable.
pub fn process_rss_mb() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        if let Some(mb) = read_proc_self_status_rss_mb() {
            return Some(mb);
        }
    }
    rss_via_getrusage_mb()
}

#[cfg(target_os = "linux")]
fn read_proc_self_status_rss_mb() -> Option<u64> {
    let text = std::fs::read_to_string("/proc/self/status").ok()?;
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            // Format: "VmRSS:	   12345 kB"
            let kb: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
            return Some(kb / 1024);
        }
    }
    None
}

#[cfg(unix)]
fn rss_via_getrusage_mb() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut usage = MaybeUninit::<libc::rusage>::uninit();
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        return None;
    }
    let usage = unsafe { usage.assume_init() };
    // Linux reports ru_maxrss in KB, macOS/BSD in bytes.
    #[cfg(target_os = "macos")]
    {
        Some(usage.ru_maxrss as u64 / (1024 * 1024))
    }
    #[cfg(not(target_os = "macos"))]
    {
        Some(usage.ru_maxrss as u64 / 1024)
    }
}

#[cfg(not(unix))]
fn rss_via_getrusage_mb() -> Option<u64> {
    None
}
