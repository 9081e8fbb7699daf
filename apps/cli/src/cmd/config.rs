//! Config inspection commands: show, path.

use crate::cmd::ConfigCommand;
use crate::config::{SavantConfig, resolve_config_path};
use anyhow::Result;
use std::path::Path;

/// Dispatch config subcommands.
pub fn run(action: &ConfigCommand, config: &SavantConfig, flag: Option<&Path>) -> Result<()> {
    match action {
        ConfigCommand::Show => print!("{}", config.to_toml()?),
        ConfigCommand::Path => println!("{}", resolve_config_path(flag)?.display()),
    }
    Ok(())
}
