//! Lock-free run statistics using atomic operations.
//!
//! Workers record outcomes without any mutex contention; the scheduler
//! reads a snapshot for the shutdown summary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Global statistics aggregated across all channel workers.
#[derive(Debug, Default)]
pub struct GlobalStats {
    pub total_sends: AtomicU64,
    pub total_success: AtomicU64,
    pub total_failures: AtomicU64,
    pub cycles_completed: AtomicU64,
    pub active_workers: AtomicU64,
    pub start_time: AtomicU64,
}

impl GlobalStats {
    pub fn new() -> Self {
        Self {
            total_sends: AtomicU64::new(0),
            total_success: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
            cycles_completed: AtomicU64::new(0),
            active_workers: AtomicU64::new(0),
            start_time: AtomicU64::new(now_secs()),
        }
    }

    /// Record a successful send.
    pub fn record_success(&self) {
        self.total_sends.fetch_add(1, Ordering::Relaxed);
        self.total_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed send (rejected or transport error).
    pub fn record_failure(&self) {
        self.total_sends.fetch_add(1, Ordering::Relaxed);
        self.total_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one completed cycle on some channel.
    pub fn record_cycle(&self) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_worker(&self) {
        self.active_workers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn remove_worker(&self) {
        self.active_workers.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn total_sends(&self) -> u64 {
        self.total_sends.load(Ordering::Relaxed)
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures.load(Ordering::Relaxed)
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::Relaxed)
    }

    pub fn active_workers(&self) -> u64 {
        self.active_workers.load(Ordering::Relaxed)
    }

    /// Sends per hour since the stats were created.
    pub fn sends_per_hour(&self) -> f64 {
        let elapsed_hours =
            now_secs().saturating_sub(self.start_time.load(Ordering::Relaxed)) as f64 / 3600.0;
        if elapsed_hours < 0.001 {
            return 0.0;
        }
        self.total_sends.load(Ordering::Relaxed) as f64 / elapsed_hours
    }

    /// Get snapshot for serialization.
    pub fn snapshot(&self) -> GlobalStatsSnapshot {
        GlobalStatsSnapshot {
            total_sends: self.total_sends.load(Ordering::Relaxed),
            total_success: self.total_success.load(Ordering::Relaxed),
            total_failures: self.total_failures.load(Ordering::Relaxed),
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            active_workers: self.active_workers.load(Ordering::Relaxed),
            sends_per_hour: self.sends_per_hour(),
        }
    }
}

/// Serializable snapshot of the global stats.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GlobalStatsSnapshot {
    pub total_sends: u64,
    pub total_success: u64,
    pub total_failures: u64,
    pub cycles_completed: u64,
    pub active_workers: u64,
    pub sends_per_hour: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = GlobalStats::new();
        stats.record_success();
        stats.record_success();
        stats.record_failure();
        stats.record_cycle();
        stats.add_worker();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_sends, 3);
        assert_eq!(snapshot.total_success, 2);
        assert_eq!(snapshot.total_failures, 1);
        assert_eq!(snapshot.cycles_completed, 1);
        assert_eq!(snapshot.active_workers, 1);
    }

    #[test]
    fn worker_count_goes_back_down() {
        let stats = GlobalStats::new();
        stats.add_worker();
        stats.add_worker();
        stats.remove_worker();
        assert_eq!(stats.active_workers(), 1);
    }
}
