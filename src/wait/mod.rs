//! Waiting module
//!
//! Precise, jitter-capable delays for the send cycles.

mod precise;

pub use precise::{wait, wait_jittered};
