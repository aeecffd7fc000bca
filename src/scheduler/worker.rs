//! Per-channel send cycle.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::{Account, Channel};
use crate::sender::{MessageSender, SendOutcome};
use crate::stats::GlobalStats;
use crate::wait;

/// Fixed pause between full cycles.
pub const CYCLE_PAUSE: Duration = Duration::from_secs(1);

/// Drives one channel's eternal send cycle.
///
/// The worker owns no shared mutable state: account and channel data are
/// read-only and the only runtime state is the worker's position in its
/// cycle. Send failures are logged and the cadence proceeds unchanged;
/// the timing is strictly time-driven, independent of outcomes.
pub struct ChannelWorker {
    account: Arc<Account>,
    channel_index: usize,
    sender: Arc<dyn MessageSender>,
    stats: Arc<GlobalStats>,
}

impl ChannelWorker {
    pub fn new(
        account: Arc<Account>,
        channel_index: usize,
        sender: Arc<dyn MessageSender>,
        stats: Arc<GlobalStats>,
    ) -> Self {
        Self {
            account,
            channel_index,
            sender,
            stats,
        }
    }

    fn channel(&self) -> &Channel {
        &self.account.channels[self.channel_index]
    }

    /// Spawn the worker as a detached task.
    ///
    /// A panicking worker logs the panic and corrects the active-worker
    /// counter before dying; no other worker is affected.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        let stats = self.stats.clone();
        let label = format!(
            "{}/{}",
            self.account.display_name(),
            self.channel().display_name()
        );

        tokio::spawn(async move {
            use futures::FutureExt;

            let run = std::panic::AssertUnwindSafe(self.run());
            if let Err(panic_info) = run.catch_unwind().await {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };

                error!("Worker {} panicked: {}. Worker stopped.", label, panic_msg);
                stats.remove_worker();
            }
        })
    }

    /// The eternal cycle. Never returns under normal operation.
    async fn run(self) {
        let account_name = self.account.display_name();
        let channel = self.channel();
        let channel_name = channel.display_name();
        let delay = channel.delay();

        self.stats.add_worker();
        info!(
            "Worker started for account {} channel {} ({} messages, delay {}s)",
            account_name,
            channel_name,
            channel.messages.len(),
            channel.delay_secs
        );

        loop {
            info!(
                "Account {} starting messages for channel {}",
                account_name, channel_name
            );

            for message in &channel.messages {
                match self.sender.send(&self.account, channel, message).await {
                    SendOutcome::Success => {
                        self.stats.record_success();
                        info!(
                            "Account {} sent message to channel {}",
                            account_name, channel_name
                        );
                    }
                    SendOutcome::RejectedByServer(status) => {
                        self.stats.record_failure();
                        warn!(
                            "Failed to send message for account {} in channel {}: status {}",
                            account_name, channel_name, status
                        );
                    }
                    SendOutcome::TransportError(reason) => {
                        self.stats.record_failure();
                        warn!(
                            "Error sending message for account {} in channel {}: {}",
                            account_name, channel_name, reason
                        );
                    }
                }

                wait::wait(delay).await;
            }

            self.stats.record_cycle();
            info!(
                "Account {} completed message cycle for channel {}",
                account_name, channel_name
            );

            wait::wait(CYCLE_PAUSE).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Test sender that records every send and returns a configured
    /// outcome per channel alias.
    struct RecordingSender {
        outcomes: HashMap<String, SendOutcome>,
        log: Mutex<Vec<(String, String, Instant)>>,
    }

    impl RecordingSender {
        fn succeeding() -> Arc<Self> {
            Arc::new(Self {
                outcomes: HashMap::new(),
                log: Mutex::new(Vec::new()),
            })
        }

        fn with_outcome(channel_alias: &str, outcome: SendOutcome) -> Arc<Self> {
            let mut outcomes = HashMap::new();
            outcomes.insert(channel_alias.to_string(), outcome);
            Arc::new(Self {
                outcomes,
                log: Mutex::new(Vec::new()),
            })
        }

        fn sends(&self) -> Vec<(String, String, Instant)> {
            self.log.lock().unwrap().clone()
        }

        fn sends_for(&self, channel_alias: &str) -> Vec<(String, Instant)> {
            self.sends()
                .into_iter()
                .filter(|(alias, _, _)| alias == channel_alias)
                .map(|(_, message, at)| (message, at))
                .collect()
        }
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(&self, _account: &Account, channel: &Channel, message: &str) -> SendOutcome {
            self.log.lock().unwrap().push((
                channel.alias.clone(),
                message.to_string(),
                Instant::now(),
            ));
            self.outcomes
                .get(&channel.alias)
                .cloned()
                .unwrap_or(SendOutcome::Success)
        }
    }

    fn channel(alias: &str, messages: &[&str], delay_secs: f64) -> Channel {
        Channel {
            id: alias.to_string(),
            url: format!("https://chat.example.com/channels/{}", alias),
            alias: alias.to_string(),
            messages: messages.iter().map(|m| m.to_string()).collect(),
            delay_secs,
        }
    }

    fn account(channels: Vec<Channel>) -> Arc<Account> {
        Arc::new(Account {
            user_id: "u1".to_string(),
            token: "secret".to_string(),
            alias: "A1".to_string(),
            channels,
        })
    }

    fn spawn_workers(
        account: Arc<Account>,
        sender: Arc<RecordingSender>,
        stats: Arc<GlobalStats>,
    ) -> Vec<tokio::task::JoinHandle<()>> {
        (0..account.channels.len())
            .map(|index| {
                ChannelWorker::new(account.clone(), index, sender.clone(), stats.clone()).spawn()
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn sends_follow_the_configured_cadence() {
        let sender = RecordingSender::succeeding();
        let stats = Arc::new(GlobalStats::new());
        let account = account(vec![channel("C1", &["hi", "bye"], 2.0)]);
        let start = Instant::now();

        let handles = spawn_workers(account, sender.clone(), stats);
        tokio::time::sleep(Duration::from_secs(10)).await;
        for handle in handles {
            handle.abort();
        }

        // Cycle period is 2 messages x 2s delay + 1s pause = 5s.
        let sends = sender.sends_for("C1");
        assert!(sends.len() >= 4, "expected at least 4 sends, got {}", sends.len());
        let offsets: Vec<u64> = sends
            .iter()
            .map(|(_, at)| at.duration_since(start).as_millis() as u64)
            .collect();
        assert_eq!(&offsets[..4], &[0, 2_000, 5_000, 7_000]);
    }

    #[tokio::test(start_paused = true)]
    async fn message_order_repeats_identically_every_cycle() {
        let sender = RecordingSender::succeeding();
        let stats = Arc::new(GlobalStats::new());
        let account = account(vec![channel("C1", &["a", "b", "c"], 0.5)]);

        let handles = spawn_workers(account, sender.clone(), stats);
        tokio::time::sleep(Duration::from_secs(6)).await;
        for handle in handles {
            handle.abort();
        }

        let messages: Vec<String> = sender
            .sends_for("C1")
            .into_iter()
            .map(|(message, _)| message)
            .collect();
        assert!(messages.len() >= 6, "got {} sends", messages.len());
        assert_eq!(&messages[..6], &["a", "b", "c", "a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn channel_timelines_are_independent() {
        // C1 fails on every send; C2 must keep its own schedule regardless.
        let sender =
            RecordingSender::with_outcome("C1", SendOutcome::TransportError("boom".to_string()));
        let stats = Arc::new(GlobalStats::new());
        let account = account(vec![
            channel("C1", &["ping"], 1.0),
            channel("C2", &["pong"], 5.0),
        ]);
        let start = Instant::now();

        let handles = spawn_workers(account, sender.clone(), stats);
        tokio::time::sleep(Duration::from_secs(10)).await;
        for handle in handles {
            handle.abort();
        }

        // C1 period: 1s delay + 1s pause; C2 period: 5s delay + 1s pause.
        let c1 = sender.sends_for("C1");
        assert!((5..=6).contains(&c1.len()), "C1 sent {} times", c1.len());

        let c2_offsets: Vec<u64> = sender
            .sends_for("C2")
            .iter()
            .map(|(_, at)| at.duration_since(start).as_millis() as u64)
            .collect();
        assert_eq!(c2_offsets, vec![0, 6_000]);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_never_break_the_cadence() {
        let sender =
            RecordingSender::with_outcome("C1", SendOutcome::RejectedByServer(429));
        let stats = Arc::new(GlobalStats::new());
        let account = account(vec![channel("C1", &["hi", "bye"], 2.0)]);
        let start = Instant::now();

        let handles = spawn_workers(account, sender.clone(), stats.clone());
        tokio::time::sleep(Duration::from_secs(10)).await;
        for handle in handles {
            handle.abort();
        }

        // Identical timeline to the all-success case: failures are logged
        // and the cycle proceeds as if the send had succeeded.
        let offsets: Vec<u64> = sender
            .sends_for("C1")
            .iter()
            .map(|(_, at)| at.duration_since(start).as_millis() as u64)
            .collect();
        assert_eq!(&offsets[..4], &[0, 2_000, 5_000, 7_000]);
        assert_eq!(stats.total_sends(), stats.total_failures());
        assert_eq!(stats.active_workers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_message_list_cycles_without_sending() {
        let sender = RecordingSender::succeeding();
        let stats = Arc::new(GlobalStats::new());
        let account = account(vec![channel("C1", &[], 3.0)]);

        let handles = spawn_workers(account, sender.clone(), stats.clone());
        tokio::time::sleep(Duration::from_secs(5)).await;
        for handle in handles {
            handle.abort();
        }

        assert!(sender.sends().is_empty());
        // One degenerate cycle per 1s pause.
        assert!(
            (5..=6).contains(&stats.cycles_completed()),
            "completed {} cycles",
            stats.cycles_completed()
        );
    }

    /// Sender that panics for one channel alias.
    struct PanickingSender {
        panic_on: String,
        inner: Arc<RecordingSender>,
    }

    #[async_trait]
    impl MessageSender for PanickingSender {
        async fn send(&self, account: &Account, channel: &Channel, message: &str) -> SendOutcome {
            if channel.alias == self.panic_on {
                panic!("sender blew up");
            }
            self.inner.send(account, channel, message).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn a_panicking_worker_dies_alone() {
        let recording = RecordingSender::succeeding();
        let sender = Arc::new(PanickingSender {
            panic_on: "C1".to_string(),
            inner: recording.clone(),
        });
        let stats = Arc::new(GlobalStats::new());
        let account = account(vec![
            channel("C1", &["boom"], 1.0),
            channel("C2", &["steady"], 1.0),
        ]);

        let handles: Vec<_> = (0..account.channels.len())
            .map(|index| {
                ChannelWorker::new(
                    account.clone(),
                    index,
                    sender.clone() as Arc<dyn MessageSender>,
                    stats.clone(),
                )
                .spawn()
            })
            .collect();
        tokio::time::sleep(Duration::from_secs(5)).await;
        for handle in handles {
            handle.abort();
        }

        // C1's worker is gone; C2 kept sending on schedule.
        assert_eq!(stats.active_workers(), 1);
        assert!(recording.sends_for("C2").len() >= 2);
    }
}
