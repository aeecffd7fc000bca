//! Configuration module
//!
//! Validated account/channel records, JSON persistence, and the
//! interactive setup wizard.

mod file;
mod setup;
mod types;

pub use file::{default_config_path, load, save, CONFIG_FILE};
pub use setup::{print_summary, run_wizard};
pub use types::{Account, Channel, Config, ConfigError};
