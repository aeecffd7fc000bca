//! Configuration data model.
//!
//! Loose on-disk records (`Raw*`) are converted into validated, immutable
//! value objects exactly once at load time. Everything downstream of the
//! conversion is read-only: the scheduler and its workers never see an
//! unvalidated field.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// A send target with its own message list and cadence.
///
/// Owned by exactly one [`Account`]; one worker is bound to it for the
/// worker's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub id: String,
    /// Referrer URL sent with every request to this channel.
    pub url: String,
    /// Display alias; defaults to the channel id.
    pub alias: String,
    /// Messages sent in this order every cycle. May be empty.
    pub messages: Vec<String>,
    /// Delay between messages in seconds. Strictly positive.
    pub delay_secs: f64,
}

impl Channel {
    pub fn display_name(&self) -> &str {
        &self.alias
    }

    /// The between-message delay as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_secs)
    }
}

/// A credentialed sender identity owning one or more channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub user_id: String,
    /// Opaque authentication token.
    pub token: String,
    /// Display alias; defaults to the user id.
    pub alias: String,
    pub channels: Vec<Channel>,
}

impl Account {
    pub fn display_name(&self) -> &str {
        &self.alias
    }
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the chat service API, e.g. `https://chat.example.com/api`.
    pub api_base: Url,
    pub accounts: Vec<Account>,
}

/// Configuration errors, all surfaced before any worker starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found at {path}; run `autocourier configure` first")]
    NotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no configuration directory available on this platform")]
    NoConfigDir,

    #[error("config has no api_base; run `autocourier configure` first")]
    MissingApiBase,

    #[error("invalid api_base `{value}`: {source}")]
    InvalidApiBase {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no accounts configured")]
    NoAccounts,

    #[error("account #{index} is missing a user id")]
    MissingUserId { index: usize },

    #[error("account `{account}` is missing a token")]
    MissingToken { account: String },

    #[error("duplicate account id `{user_id}`")]
    DuplicateAccount { user_id: String },

    #[error("account `{account}`: channel #{index} is missing an id")]
    MissingChannelId { account: String, index: usize },

    #[error("account `{account}`, channel `{channel}`: invalid referrer URL `{value}`: {source}")]
    InvalidChannelUrl {
        account: String,
        channel: String,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error(
        "account `{account}`, channel `{channel}`: delay must be a positive number of seconds, got {delay}"
    )]
    InvalidDelay {
        account: String,
        channel: String,
        delay: f64,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(serde_json::Error),

    #[error("interactive input failed: {0}")]
    Io(#[from] std::io::Error),
}

// ---- On-disk records ----
//
// The file shape keeps the original layout: a top-level `users` array with
// snake_case keys, aliases and messages optional, delay defaulting to 1s.

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct RawConfig {
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub users: Vec<RawAccount>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct RawAccount {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub channels: Vec<RawChannel>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RawChannel {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default = "default_delay")]
    pub delay: f64,
}

fn default_delay() -> f64 {
    1.0
}

impl Default for RawChannel {
    fn default() -> Self {
        Self {
            url: String::new(),
            id: String::new(),
            alias: None,
            messages: Vec::new(),
            delay: default_delay(),
        }
    }
}

fn alias_or(alias: Option<String>, fallback: &str) -> String {
    match alias {
        Some(a) if !a.trim().is_empty() => a.trim().to_string(),
        _ => fallback.to_string(),
    }
}

impl RawConfig {
    /// Validate and convert into the immutable runtime configuration.
    pub(crate) fn into_config(self) -> Result<Config, ConfigError> {
        let api_base_raw = match self.api_base {
            Some(v) if !v.trim().is_empty() => v,
            _ => return Err(ConfigError::MissingApiBase),
        };
        let api_base =
            Url::parse(api_base_raw.trim()).map_err(|source| ConfigError::InvalidApiBase {
                value: api_base_raw.clone(),
                source,
            })?;

        if self.users.is_empty() {
            return Err(ConfigError::NoAccounts);
        }

        let mut seen = HashSet::new();
        let mut accounts = Vec::with_capacity(self.users.len());
        for (index, user) in self.users.into_iter().enumerate() {
            accounts.push(user.into_account(index, &mut seen)?);
        }

        Ok(Config { api_base, accounts })
    }
}

impl RawAccount {
    fn into_account(
        self,
        index: usize,
        seen: &mut HashSet<String>,
    ) -> Result<Account, ConfigError> {
        let user_id = self.user_id.trim().to_string();
        if user_id.is_empty() {
            return Err(ConfigError::MissingUserId { index });
        }
        if !seen.insert(user_id.clone()) {
            return Err(ConfigError::DuplicateAccount { user_id });
        }

        let token = self.token.trim().to_string();
        if token.is_empty() {
            return Err(ConfigError::MissingToken { account: user_id });
        }

        let alias = alias_or(self.alias, &user_id);

        let mut channels = Vec::with_capacity(self.channels.len());
        for (channel_index, channel) in self.channels.into_iter().enumerate() {
            channels.push(channel.into_channel(&alias, channel_index)?);
        }

        Ok(Account {
            user_id,
            token,
            alias,
            channels,
        })
    }
}

impl RawChannel {
    fn into_channel(self, account: &str, index: usize) -> Result<Channel, ConfigError> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(ConfigError::MissingChannelId {
                account: account.to_string(),
                index,
            });
        }

        let alias = alias_or(self.alias, &id);

        let url = self.url.trim().to_string();
        Url::parse(&url).map_err(|source| ConfigError::InvalidChannelUrl {
            account: account.to_string(),
            channel: alias.clone(),
            value: url.clone(),
            source,
        })?;

        if !(self.delay.is_finite() && self.delay > 0.0) {
            return Err(ConfigError::InvalidDelay {
                account: account.to_string(),
                channel: alias,
                delay: self.delay,
            });
        }

        Ok(Channel {
            id,
            url,
            alias,
            messages: self.messages,
            delay_secs: self.delay,
        })
    }
}

impl Config {
    pub(crate) fn to_raw(&self) -> RawConfig {
        RawConfig {
            api_base: Some(self.api_base.to_string()),
            users: self
                .accounts
                .iter()
                .map(|account| RawAccount {
                    user_id: account.user_id.clone(),
                    token: account.token.clone(),
                    alias: Some(account.alias.clone()),
                    channels: account
                        .channels
                        .iter()
                        .map(|channel| RawChannel {
                            url: channel.url.clone(),
                            id: channel.id.clone(),
                            alias: Some(channel.alias.clone()),
                            messages: channel.messages.clone(),
                            delay: channel.delay_secs,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
