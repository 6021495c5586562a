//! Wall-clock and CPU time accounting.
//!
//! The engine only runs while `step` is executing, so time is accumulated
//! per call rather than measured from `reset`. CPU time is the *user* time of
//! the calling thread: work done by other threads of the process, and time
//! spent in the kernel, is not charged to the run.

use std::time::{Duration, Instant};

/// User CPU time of the calling thread.
#[cfg(target_os = "linux")]
pub fn thread_user_time() -> Option<Duration> {
    // SAFETY: `rusage` is plain old data; all-zero is a valid value.
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    // SAFETY: `usage` is a valid, writable rusage for the duration of the call.
    let rc = unsafe { libc::getrusage(libc::RUSAGE_THREAD, &mut usage) };
    if rc != 0 {
        return None;
    }
    let tv = usage.ru_utime;
    Some(Duration::new(tv.tv_sec as u64, (tv.tv_usec as u32) * 1_000))
}

/// CPU time of the calling thread; user and system time are not separated here.
#[cfg(all(unix, not(target_os = "linux")))]
pub fn thread_user_time() -> Option<Duration> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_THREAD_CPUTIME_ID, &mut ts) };
    if rc != 0 {
        return None;
    }
    Some(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
}

#[cfg(not(unix))]
pub fn thread_user_time() -> Option<Duration> {
    None
}

/// Accumulates time over a sequence of measured sections.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    wall: Duration,
    cpu: Option<Duration>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` and add its duration.
    pub fn measure<T>(&mut self, f: impl FnOnce() -> T) -> T {
        let cpu_start = thread_user_time();
        let wall_start = Instant::now();
        let out = f();
        self.wall += wall_start.elapsed();
        if let (Some(start), Some(end)) = (cpu_start, thread_user_time()) {
            let spent = end.saturating_sub(start);
            self.cpu = Some(self.cpu.unwrap_or_default() + spent);
        }
        out
    }

    pub fn wall(&self) -> Duration {
        self.wall
    }

    /// `None` until a section was measured on a platform with CPU clocks.
    pub fn cpu(&self) -> Option<Duration> {
        self.cpu
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
