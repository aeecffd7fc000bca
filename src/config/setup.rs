//! Interactive configuration wizard and summary display.
//!
//! Everything here talks to a human on a terminal, so output goes through
//! `println!` rather than the log sink.

use std::io::{self, Write};

use url::Url;

use super::types::{Config, ConfigError, RawAccount, RawChannel, RawConfig};

fn prompt(label: &str) -> Result<String, ConfigError> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_secret(label: &str) -> Result<String, ConfigError> {
    print!("{}", label);
    io::stdout().flush()?;
    Ok(rpassword::read_password()?.trim().to_string())
}

fn prompt_count(label: &str) -> Result<usize, ConfigError> {
    loop {
        match prompt(label)?.parse::<usize>() {
            Ok(n) if n > 0 => return Ok(n),
            _ => println!("Please enter a number greater than 0"),
        }
    }
}

fn prompt_delay(label: &str) -> Result<f64, ConfigError> {
    loop {
        match prompt(label)?.parse::<f64>() {
            Ok(d) if d.is_finite() && d > 0.0 => return Ok(d),
            _ => println!("Please enter a number greater than 0"),
        }
    }
}

fn prompt_api_base() -> Result<Url, ConfigError> {
    loop {
        let value = prompt("Enter chat service API base URL: ")?;
        match Url::parse(&value) {
            Ok(url) => return Ok(url),
            Err(e) => println!("Please enter a valid URL ({})", e),
        }
    }
}

fn none_if_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn configure_channel(number: usize) -> Result<RawChannel, ConfigError> {
    println!("\n--- Channel #{} configuration ---", number);
    let url = prompt("Enter channel URL: ")?;
    let id = prompt("Enter channel ID: ")?;
    let alias = prompt("Enter alias for this channel (press Enter to use the channel ID): ")?;
    let delay = prompt_delay("Enter delay between messages for this channel (in seconds): ")?;

    println!("\nHow many messages should be sent in this channel?");
    let message_count = prompt_count("Number of messages: ")?;

    let mut messages = Vec::with_capacity(message_count);
    for i in 0..message_count {
        messages.push(prompt(&format!(
            "Enter message #{} for this channel: ",
            i + 1
        ))?);
    }

    Ok(RawChannel {
        url,
        id,
        alias: none_if_empty(alias),
        messages,
        delay,
    })
}

fn configure_account(number: usize) -> Result<RawAccount, ConfigError> {
    println!("\n=== Configuring account #{} ===", number);
    let user_id = prompt("Enter user ID: ")?;
    let alias = prompt("Enter alias name for this account (press Enter to skip): ")?;
    let token = prompt_secret("Enter authentication token: ")?;

    println!(
        "\nHow many channels should account #{} send messages to?",
        number
    );
    let channel_count = prompt_count("Number of channels: ")?;

    let mut channels = Vec::with_capacity(channel_count);
    for i in 0..channel_count {
        channels.push(configure_channel(i + 1)?);
    }

    Ok(RawAccount {
        user_id,
        token,
        alias: none_if_empty(alias),
        channels,
    })
}

/// Run the interactive multi-account configuration wizard.
///
/// The collected records go through the same validation as a loaded file,
/// so a wizard run can never produce a configuration the daemon would
/// refuse to start from.
pub fn run_wizard() -> Result<Config, ConfigError> {
    println!("\n=== Multi-account configuration ===");
    let api_base = prompt_api_base()?;
    let account_count = prompt_count("How many accounts do you want to configure? ")?;

    let mut users = Vec::with_capacity(account_count);
    for i in 0..account_count {
        users.push(configure_account(i + 1)?);
    }

    let raw = RawConfig {
        api_base: Some(api_base.to_string()),
        users,
    };
    raw.into_config()
}

/// Print a human-readable summary of the configuration.
pub fn print_summary(config: &Config) {
    println!("\nCurrent configuration summary:");
    println!("  API base: {}", config.api_base);
    for account in &config.accounts {
        println!(
            "\nAccount: {} (ID: {})",
            account.display_name(),
            account.user_id
        );
        for channel in &account.channels {
            println!(
                "  Channel: {} (ID: {})",
                channel.display_name(),
                channel.id
            );
            println!("    Delay: {} seconds", channel.delay_secs);
            println!("    Messages ({}):", channel.messages.len());
            for (i, message) in channel.messages.iter().enumerate() {
                println!("      {}. {}", i + 1, message);
            }
        }
    }
}
