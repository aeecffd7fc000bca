//! Concurrent scheduling engine.
//!
//! One detached task per channel drives an endless send-then-wait cycle;
//! accounts fan out through [`AccountSupervisor`] and the top-level
//! [`Scheduler`] parks until its shutdown handle fires.

mod runner;
mod worker;

pub use runner::{AccountSupervisor, Scheduler, SchedulerError, ShutdownHandle};
pub use worker::{ChannelWorker, CYCLE_PAUSE};
