//! Outbound message sending.
//!
//! The scheduling core depends only on the narrow [`MessageSender`]
//! contract; the HTTP implementation lives in [`HttpSender`].

mod http;

pub use http::HttpSender;

use async_trait::async_trait;

use crate::config::{Account, Channel};

/// Classification of one send attempt. Produced and consumed within a
/// single send invocation; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The service accepted the message.
    Success,
    /// A response was obtained but its status indicates failure.
    RejectedByServer(u16),
    /// The request failed before a response was obtained.
    TransportError(String),
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SendOutcome::Success)
    }
}

/// One outbound send per call.
///
/// Implementations must capture every transport and protocol failure and
/// report it through the returned [`SendOutcome`]; nothing may propagate
/// past this boundary. Retry policy, if any, belongs to the caller, and
/// the scheduling core has none.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, account: &Account, channel: &Channel, message: &str) -> SendOutcome;
}
