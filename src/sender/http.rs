//! HTTP message sender.
//!
//! Posts one JSON message body per call to the chat service and folds the
//! result into [`SendOutcome`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{MessageSender, SendOutcome};
use crate::config::{Account, Channel};

/// Default request timeout. A send must return in bounded time; a slow
/// service can stall at most its own channel's cadence.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`MessageSender`] implementation over the chat service's HTTP API.
pub struct HttpSender {
    client: Client,
    api_base: Url,
}

impl HttpSender {
    pub fn new(api_base: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(api_base, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(api_base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("autocourier/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, api_base })
    }

    fn message_endpoint(&self, channel: &Channel) -> String {
        format!(
            "{}/channels/{}/messages",
            self.api_base.as_str().trim_end_matches('/'),
            channel.id
        )
    }
}

#[async_trait]
impl MessageSender for HttpSender {
    async fn send(&self, account: &Account, channel: &Channel, message: &str) -> SendOutcome {
        let body = serde_json::json!({ "content": message });

        let result = self
            .client
            .post(self.message_endpoint(channel))
            .header("authorization", &account.token)
            .header("user-id", &account.user_id)
            .header("referer", &channel.url)
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    SendOutcome::Success
                } else {
                    SendOutcome::RejectedByServer(status.as_u16())
                }
            }
            Err(e) => SendOutcome::TransportError(e.to_string()),
        }
    }
}
