//! Account fan-out and the top-level scheduler.

use std::sync::Arc;

use tokio::sync::Notify;
use tracing::info;

use super::worker::ChannelWorker;
use crate::config::Account;
use crate::sender::MessageSender;
use crate::stats::GlobalStats;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("no accounts configured; run `autocourier configure` first")]
    NoAccounts,
}

/// Launches the workers for one account's channels.
pub struct AccountSupervisor {
    sender: Arc<dyn MessageSender>,
    stats: Arc<GlobalStats>,
}

impl AccountSupervisor {
    pub fn new(sender: Arc<dyn MessageSender>, stats: Arc<GlobalStats>) -> Self {
        Self { sender, stats }
    }

    /// Spawn one detached worker per channel of `account` and return once
    /// all are launched. Workers never terminate, so none are awaited, and
    /// no ordering exists between channels: each runs its own cadence
    /// from its own start time.
    pub fn run(&self, account: Arc<Account>) {
        info!(
            "Starting {} channel workers for account {}",
            account.channels.len(),
            account.display_name()
        );

        for index in 0..account.channels.len() {
            ChannelWorker::new(
                account.clone(),
                index,
                self.sender.clone(),
                self.stats.clone(),
            )
            .spawn();
        }
    }
}

/// Trigger for ending a running [`Scheduler`].
#[derive(Clone)]
pub struct ShutdownHandle {
    notify: Arc<Notify>,
}

impl ShutdownHandle {
    /// Mark shutdown. `notify_one` stores a permit, so a trigger that
    /// fires before the scheduler parks is not lost.
    pub fn shutdown(&self) {
        self.notify.notify_one();
    }
}

/// Top-level scheduler: one supervisor per account, then park until the
/// shutdown handle fires.
pub struct Scheduler {
    sender: Arc<dyn MessageSender>,
    stats: Arc<GlobalStats>,
    shutdown: Arc<Notify>,
}

impl Scheduler {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self::with_stats(sender, Arc::new(GlobalStats::new()))
    }

    pub fn with_stats(sender: Arc<dyn MessageSender>, stats: Arc<GlobalStats>) -> Self {
        Self {
            sender,
            stats,
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn stats(&self) -> Arc<GlobalStats> {
        self.stats.clone()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            notify: self.shutdown.clone(),
        }
    }

    /// Launch every account's workers, then block until shutdown.
    ///
    /// Workers are abandoned on return: in-flight sends get no completion
    /// guarantee, and the process is expected to exit right after.
    pub async fn run(&self, accounts: Vec<Account>) -> Result<(), SchedulerError> {
        if accounts.is_empty() {
            return Err(SchedulerError::NoAccounts);
        }

        info!(
            "Starting message sending for all {} accounts simultaneously...",
            accounts.len()
        );

        let supervisor = AccountSupervisor::new(self.sender.clone(), self.stats.clone());
        for account in accounts {
            supervisor.run(Arc::new(account));
        }

        self.shutdown.notified().await;

        let snapshot = self.stats.snapshot();
        info!(
            "Received shutdown signal. {} sends ({} failed) across {} workers; exiting without draining.",
            snapshot.total_sends, snapshot.total_failures, snapshot.active_workers
        );
        Ok(())
    }
}
