//! Configuration commands.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration, resolving every secret reference.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.sync_config()?;
    config.discord_config()?;
    config.sheets_config()?;
    config.storage_config()?;

    if config.discord.notification_channel_id.is_none() {
        return Err(ClientError::config(
            "discord.notification_channel_id is not set",
        ));
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    println!("config: {}", ClientConfig::default_path().display());
    Ok(())
}
