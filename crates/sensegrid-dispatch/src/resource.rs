//! Process resource probe
//!
//! Captures a CPU/memory snapshot for the run summary. CPU usage is
//! reported as process CPU time over wall time since the probe started
//! (e.g. 1.5 = 150% of one core).

use serde::Serialize;
use std::time::Instant;

/// Resource usage over the lifetime of one probe
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResourceSnapshot {
    /// Process CPU time / wall time since the probe started
    pub cpu_ratio: f64,
    /// Resident set size in bytes
    pub rss_bytes: i64,
    /// Logical CPU count
    pub cores: usize,
}

/// Measures process resource usage between `start` and `snapshot`
#[derive(Debug)]
pub struct ResourceProbe {
    start_cpu: f64,
    start_wall: Instant,
}

impl ResourceProbe {
    pub fn start() -> Self {
        Self {
            start_cpu: get_process_cpu_time(),
            start_wall: Instant::now(),
        }
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        let wall_elapsed = self.start_wall.elapsed().as_secs_f64();
        let cpu_elapsed = get_process_cpu_time() - self.start_cpu;
        let cpu_ratio = if wall_elapsed > 0.0 {
            cpu_elapsed / wall_elapsed
        } else {
            0.0
        };

        ResourceSnapshot {
            cpu_ratio,
            rss_bytes: get_process_rss_bytes(),
            cores: num_cpus_available(),
        }
    }
}

/// Returns total user+system CPU time consumed by this process, in seconds.
#[cfg(unix)]
fn get_process_cpu_time() -> f64 {
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return 0.0;
    }
    let user = usage.ru_utime.tv_sec as f64 + usage.ru_utime.tv_usec as f64 * 1e-6;
    let sys = usage.ru_stime.tv_sec as f64 + usage.ru_stime.tv_usec as f64 * 1e-6;
    user + sys
}

#[cfg(not(unix))]
fn get_process_cpu_time() -> f64 {
    0.0
}

/// Returns the resident set size of this process in bytes.
#[cfg(target_os = "macos")]
fn get_process_rss_bytes() -> i64 {
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return 0;
    }
    // On macOS ru_maxrss is in bytes
    usage.ru_maxrss as i64
}

#[cfg(target_os = "linux")]
fn get_process_rss_bytes() -> i64 {
    // Read from /proc/self/statm — field 1 is RSS in pages
    if let Ok(statm) = std::fs::read_to_string("/proc/self/statm") {
        if let Some(rss_pages) = statm.split_whitespace().nth(1) {
            if let Ok(pages) = rss_pages.parse::<i64>() {
                let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as i64;
                return pages * page_size;
            }
        }
    }
    0
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn get_process_rss_bytes() -> i64 {
    0
}

/// Number of logical CPUs.
fn num_cpus_available() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_well_formed() {
        let probe = ResourceProbe::start();
        // Burn a little CPU so the ratio has something to measure.
        let mut acc = 0u64;
        for i in 0..200_000u64 {
            acc = acc.wrapping_add(i * i);
        }
        assert!(acc > 0);

        let snapshot = probe.snapshot();
        assert!(snapshot.cpu_ratio >= 0.0);
        assert!(snapshot.cores >= 1);
        #[cfg(target_os = "linux")]
        assert!(snapshot.rss_bytes > 0);
    }
}
