//! Slice-bounded precise waiting.
//!
//! Runtime sleep primitives routinely overshoot by tens of milliseconds,
//! and that error compounds over thousands of send cycles. The waiter
//! re-checks a monotonic clock between bounded sleep slices and returns as
//! soon as the cumulative elapsed time reaches the target, keeping the
//! error in the millisecond range without pinning a core.

use std::time::Duration;

use rand::Rng;
use tokio::time::{sleep, Instant};

/// Upper bound for a single sleep slice.
const MAX_SLICE: Duration = Duration::from_millis(100);

/// Suspend the calling task for `duration`.
///
/// A zero duration resolves immediately.
pub async fn wait(duration: Duration) {
    if duration.is_zero() {
        return;
    }

    let start = Instant::now();
    loop {
        let elapsed = start.elapsed();
        if elapsed >= duration {
            return;
        }
        sleep((duration - elapsed).min(MAX_SLICE)).await;
    }
}

/// Suspend for `duration` plus a uniform random jitter drawn from
/// `[jitter_min, jitter_max]` seconds.
///
/// Degenerate bounds (`0, 0`) make this equivalent to [`wait`]. A jitter
/// that drives the total below zero resolves immediately.
pub async fn wait_jittered(duration: Duration, jitter_min: f64, jitter_max: f64) {
    let total = duration.as_secs_f64() + sample_jitter(jitter_min, jitter_max);
    if total <= 0.0 {
        return;
    }
    wait(Duration::from_secs_f64(total)).await;
}

fn sample_jitter(min: f64, max: f64) -> f64 {
    if min == 0.0 && max == 0.0 {
        return 0.0;
    }
    if min >= max {
        return min;
    }
    rand::thread_rng().gen_range(min..=max)
}
