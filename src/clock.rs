//! Combined process clock reporting user, system and real time.
//!
//! Only benchmarks consume this; the construction itself never reads
//! the clock.

use std::time::{Duration, Instant};

/// Times elapsed between two [`CombinedStamp`]s.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CombinedTimes {
    pub user: Duration,
    pub system: Duration,
    pub real: Duration,
}

/// A point in time on all three clocks at once.
#[derive(Copy, Clone, Debug)]
pub struct CombinedStamp {
    user_ticks: i64,
    system_ticks: i64,
    real: Instant,
}

/// Clock over process user time, process system time and wall time.
pub struct CombinedClock;

impl CombinedClock {
    pub fn now() -> CombinedStamp {
        let (user_ticks, system_ticks) = process_ticks();
        CombinedStamp {
            user_ticks,
            system_ticks,
            real: Instant::now(),
        }
    }
}

impl CombinedStamp {
    /// Times spent since this stamp was taken.
    pub fn elapsed(&self) -> CombinedTimes {
        let (user_now, system_now) = process_ticks();
        CombinedTimes {
            user: ticks_to_duration(user_now.saturating_sub(self.user_ticks)),
            system: ticks_to_duration(system_now.saturating_sub(self.system_ticks)),
            real: self.real.elapsed(),
        }
    }
}

fn ticks_to_duration(ticks: i64) -> Duration {
    let per_sec = ticks_per_second();
    if per_sec <= 0 || ticks <= 0 {
        return Duration::default();
    }
    Duration::from_secs_f64(ticks as f64 / per_sec as f64)
}

cfg_if! {
    if #[cfg(unix)] {
        fn process_ticks() -> (i64, i64) {
            let mut usage: libc::tms = unsafe { std::mem::zeroed() };
            unsafe { libc::times(&mut usage) };
            (usage.tms_utime as i64, usage.tms_stime as i64)
        }

        fn ticks_per_second() -> i64 {
            unsafe { libc::sysconf(libc::_SC_CLK_TCK) as i64 }
        }
    } else {
        // No per-process clock available; only real time is reported.
        fn process_ticks() -> (i64, i64) {
            (0, 0)
        }

        fn ticks_per_second() -> i64 {
            0
        }
    }
}
