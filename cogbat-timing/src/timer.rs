use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Clock used for reaction times, deadlines and timestamps.
pub trait Timer: Clone + Send + Sync {
    type Timestamp: Copy + Clone + Send + Sync;
    /// Monotonic time since the timer was created.
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
    fn sleep(&self, d: Duration);
    /// Wall-clock milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> i64;
}

/// Monotonic nanosecond clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
}

impl Timer for HighPrecisionTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
    fn epoch_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{CLOCK_MONOTONIC, EINTR, TIMER_ABSTIME, clock_gettime, clock_nanosleep, timespec};

        let started = Instant::now();
        let mut now = timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: `now` is a valid, writable timespec.
        if unsafe { clock_gettime(CLOCK_MONOTONIC, &mut now) } != 0 {
            std::thread::sleep(duration);
            return;
        }
        let deadline = deadline_after(now, duration);

        // absolute deadline: an interrupted call resumes without oversleeping
        loop {
            // SAFETY: `deadline` is a valid timespec; absolute sleeps never write a remainder.
            let rc = unsafe {
                clock_nanosleep(CLOCK_MONOTONIC, TIMER_ABSTIME, &deadline, std::ptr::null_mut())
            };
            match rc {
                0 => return,
                EINTR => continue,
                _ => {
                    tracing::debug!(rc, "clock_nanosleep failed, falling back to thread::sleep");
                    std::thread::sleep(duration.saturating_sub(started.elapsed()));
                    return;
                }
            }
        }
    }
}

#[cfg(target_os = "linux")]
fn deadline_after(now: libc::timespec, d: Duration) -> libc::timespec {
    const NANOS_PER_SEC: i64 = 1_000_000_000;
    let nanos = now.tv_nsec as i64 + i64::from(d.subsec_nanos());
    libc::timespec {
        tv_sec: now.tv_sec + d.as_secs() as libc::time_t + (nanos / NANOS_PER_SEC) as libc::time_t,
        tv_nsec: (nanos % NANOS_PER_SEC) as libc::c_long,
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can hold one handle while the
/// controller owns another. `sleep` advances the clock instead of blocking.
#[derive(Debug, Clone)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
    epoch_base_ms: i64,
}

impl ManualTimer {
    pub fn new(epoch_base_ms: i64) -> Self {
        Self {
            now_ns: Arc::new(AtomicU64::new(0)),
            epoch_base_ms,
        }
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns.fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jumps to an absolute monotonic time; never moves backwards.
    pub fn set(&self, ns: u64) {
        self.now_ns.fetch_max(ns, Ordering::SeqCst);
    }
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new(1_700_000_000_000)
    }
}

impl Timer for ManualTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
    fn epoch_ms(&self) -> i64 {
        self.epoch_base_ms + (self.now() / 1_000_000) as i64
    }
}
